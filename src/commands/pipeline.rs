//! Command Pipeline
//!
//! decode -> load -> authorize -> process -> commit.
//!
//! Authorization policy belongs to the caller, who passes a decision function.
//! Processing is pure so a command can be replayed against the same history
//! and reach the same decision.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::domain::{Actor, DomainError, DomainEvent, Resource};
use crate::error::{AppError, AppResult};
use crate::event_store::{Committed, EventStorage, EventStore, ResourceEvents};

/// A request to change one resource
pub trait Command: DeserializeOwned {
    /// Name used in logs
    const NAME: &'static str;

    /// Resource whose history decides this command
    fn resource(&self) -> Resource;

    /// Input checks that need no history
    fn validate(&self) -> Result<(), DomainError> {
        Ok(())
    }

    /// Decide what, if anything, happened.
    ///
    /// Must be deterministic in its input and free of side effects.
    fn process(input: ProcessInput<'_, Self>) -> Option<DomainEvent>;
}

/// Everything `process` may look at
#[derive(Debug)]
pub struct ProcessInput<'a, C> {
    pub command: C,
    /// History of the command's resource, in commit order
    pub events: &'a [DomainEvent],
    pub actor: &'a Actor,
    pub now: DateTime<Utc>,
}

/// Result of a handled command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Committed(Committed),
    /// The command was valid but would not change anything
    NoChange,
}

impl CommandOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, CommandOutcome::Committed(_))
    }
}

/// Runs commands against an event store
#[derive(Debug, Clone)]
pub struct CommandPipeline<S> {
    store: EventStore<S>,
}

impl<S: EventStorage> CommandPipeline<S> {
    pub fn new(store: EventStore<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &EventStore<S> {
        &self.store
    }

    /// Handle a raw command.
    ///
    /// `authorize` sees the actor and the resource's history. A lost commit
    /// race is returned as [`AppError::ConcurrencyConflict`]; retrying is the
    /// caller's decision.
    pub async fn handle<C, A>(
        &self,
        raw: serde_json::Value,
        actor: Option<&Actor>,
        authorize: A,
    ) -> AppResult<CommandOutcome>
    where
        C: Command,
        A: FnOnce(&Actor, &[DomainEvent]) -> bool,
    {
        let command: C = decode_command(raw)?;
        self.execute(command, actor, authorize).await
    }

    /// Handle an already-decoded command
    pub async fn execute<C, A>(
        &self,
        command: C,
        actor: Option<&Actor>,
        authorize: A,
    ) -> AppResult<CommandOutcome>
    where
        C: Command,
        A: FnOnce(&Actor, &[DomainEvent]) -> bool,
    {
        command.validate()?;

        let actor = actor.ok_or(AppError::Unauthorized)?;
        let resource = command.resource();
        let ResourceEvents { events, version } = self.store.get_resource_events(&resource).await?;

        if !authorize(actor, &events) {
            tracing::info!(command = C::NAME, resource = %resource, ?actor, "Command forbidden");
            return Err(AppError::Forbidden(format!(
                "not permitted to run {} on {}",
                C::NAME,
                resource
            )));
        }

        let decision = C::process(ProcessInput {
            command,
            events: &events,
            actor,
            now: Utc::now(),
        });

        let Some(event) = decision else {
            tracing::debug!(command = C::NAME, resource = %resource, "Command changed nothing");
            return Ok(CommandOutcome::NoChange);
        };

        let committed = self.store.commit(&resource, version, &event).await?;
        tracing::info!(
            command = C::NAME,
            resource = %resource,
            version = committed.version,
            event_type = event.event_type(),
            "Command committed"
        );

        Ok(CommandOutcome::Committed(committed))
    }
}

/// Strictly decode raw input into a command
pub fn decode_command<C: Command>(raw: serde_json::Value) -> AppResult<C> {
    serde_json::from_value(raw)
        .map_err(|e| AppError::BadRequest(format!("invalid {} command: {}", C::NAME, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{AddOwner, CreateArea};
    use crate::domain::ResourceVersion;
    use crate::event_store::{EventRow, EventStoreError, InMemoryEventStorage};
    use serde_json::json;
    use uuid::Uuid;

    fn pipeline() -> CommandPipeline<InMemoryEventStorage> {
        CommandPipeline::new(EventStore::new(InMemoryEventStorage::new()))
    }

    fn allow(_: &Actor, _: &[DomainEvent]) -> bool {
        true
    }

    #[tokio::test]
    async fn test_unknown_field_is_bad_request() {
        let result = pipeline()
            .handle::<CreateArea, _>(
                json!({"id": Uuid::new_v4(), "name": "Wood", "colour": "red"}),
                Some(&Actor::System),
                allow,
            )
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_missing_actor_is_unauthorized() {
        let result = pipeline()
            .handle::<CreateArea, _>(json!({"id": Uuid::new_v4(), "name": "Wood"}), None, allow)
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_refused_actor_is_forbidden_and_nothing_is_written() {
        let pipeline = pipeline();
        let result = pipeline
            .handle::<CreateArea, _>(
                json!({"id": Uuid::new_v4(), "name": "Wood"}),
                Some(&Actor::System),
                |_, _| false,
            )
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert!(pipeline.store().storage().is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_commit_then_no_change() {
        let pipeline = pipeline();
        let raw = json!({"id": Uuid::new_v4(), "name": "Wood"});

        let first = pipeline
            .handle::<CreateArea, _>(raw.clone(), Some(&Actor::System), allow)
            .await
            .unwrap();
        assert!(first.is_committed());

        let second = pipeline
            .handle::<CreateArea, _>(raw, Some(&Actor::System), allow)
            .await
            .unwrap();
        assert_eq!(second, CommandOutcome::NoChange);
    }

    #[tokio::test]
    async fn test_authorize_sees_resource_history() {
        let pipeline = pipeline();
        let area_id = Uuid::new_v4();
        pipeline
            .execute(
                CreateArea { id: area_id, name: "Wood".to_string() },
                Some(&Actor::System),
                allow,
            )
            .await
            .unwrap();

        let mut seen = 0;
        pipeline
            .execute(
                AddOwner { area_id, member_number: 3 },
                Some(&Actor::System),
                |_, events| {
                    seen = events.len();
                    true
                },
            )
            .await
            .unwrap();
        assert_eq!(seen, 1);
    }

    /// Storage whose per-resource reads are always empty, as if another
    /// writer committed right after our load.
    #[derive(Debug, Clone)]
    struct StaleReads(InMemoryEventStorage);

    impl EventStorage for StaleReads {
        async fn insert_if_absent(&self, row: &EventRow) -> Result<u64, EventStoreError> {
            self.0.insert_if_absent(row).await
        }

        async fn fetch_all(&self) -> Result<Vec<EventRow>, EventStoreError> {
            self.0.fetch_all().await
        }

        async fn fetch_resource(&self, _: &Resource) -> Result<Vec<EventRow>, EventStoreError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_lost_race_surfaces_conflict() {
        let inner = InMemoryEventStorage::new();
        let area_id = Uuid::new_v4();
        let other = DomainEvent::AreaCreated {
            id: area_id,
            name: "Metal".to_string(),
            recorded_by: Actor::System,
            recorded_at: Utc::now(),
        };
        EventStore::new(inner.clone())
            .commit(&Resource::area(area_id), ResourceVersion::NoSuchResource, &other)
            .await
            .unwrap();

        let pipeline = CommandPipeline::new(EventStore::new(StaleReads(inner.clone())));
        let result = pipeline
            .execute(
                CreateArea { id: area_id, name: "Wood".to_string() },
                Some(&Actor::System),
                allow,
            )
            .await;

        assert!(matches!(result, Err(AppError::ConcurrencyConflict { .. })));
        assert!(result.unwrap_err().is_retryable());
        assert_eq!(inner.len().unwrap(), 1);
    }
}
