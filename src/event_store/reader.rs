//! Event Reader
//!
//! Replays the log, decoding every row. A row that fails to decode fails the
//! whole read: corrupt history is a systemic fault, not something to skip.

use crate::domain::{DomainEvent, Resource, ResourceVersion};

use super::{EventRow, EventStorage, EventStore, EventStoreError};

/// Events of one resource together with its current version
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceEvents {
    pub events: Vec<DomainEvent>,
    pub version: ResourceVersion,
}

/// An event together with the id of the row it was stored in
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedEvent {
    pub id: String,
    pub event: DomainEvent,
}

impl<S: EventStorage> EventStore<S> {
    /// Every event in the log, in insertion order
    pub async fn get_all(&self) -> Result<Vec<DomainEvent>, EventStoreError> {
        let rows = self.storage().fetch_all().await?;
        rows.iter().map(decode_row).collect()
    }

    /// Like [`EventStore::get_all`], keeping each row's id
    pub async fn get_all_logged(&self) -> Result<Vec<LoggedEvent>, EventStoreError> {
        let rows = self.storage().fetch_all().await?;
        rows.iter()
            .map(|row| {
                Ok(LoggedEvent {
                    id: row.id.clone(),
                    event: decode_row(row)?,
                })
            })
            .collect()
    }

    /// Events of one resource in commit order, plus its current version
    pub async fn get_resource_events(
        &self,
        resource: &Resource,
    ) -> Result<ResourceEvents, EventStoreError> {
        let rows = self.storage().fetch_resource(resource).await?;
        let version = ResourceVersion::from_max(rows.iter().map(|row| row.resource_version).max());
        let events = rows.iter().map(decode_row).collect::<Result<Vec<_>, _>>()?;

        Ok(ResourceEvents { events, version })
    }
}

fn decode_row(row: &EventRow) -> Result<DomainEvent, EventStoreError> {
    DomainEvent::decode(&row.event_type, &row.payload).map_err(|source| {
        tracing::error!(
            event_id = %row.id,
            event_type = %row.event_type,
            error = %source,
            "Stored event failed to decode"
        );
        EventStoreError::Decode {
            event_id: row.id.clone(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Actor;
    use crate::event_store::InMemoryEventStorage;
    use chrono::Utc;
    use serde_json::json;

    fn declared(member_number: u64) -> DomainEvent {
        DomainEvent::SuperUserDeclared {
            member_number,
            recorded_by: Actor::System,
            recorded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_unknown_resource_has_no_version() {
        let store = EventStore::new(InMemoryEventStorage::new());
        let loaded = store.get_resource_events(&Resource::member(1)).await.unwrap();
        assert!(loaded.events.is_empty());
        assert_eq!(loaded.version, ResourceVersion::NoSuchResource);
    }

    #[tokio::test]
    async fn test_version_follows_commit_count() {
        let store = EventStore::new(InMemoryEventStorage::new());
        let resource = Resource::member(12);

        let mut version = ResourceVersion::NoSuchResource;
        for _ in 0..4 {
            let committed = store.commit(&resource, version, &declared(12)).await.unwrap();
            version = ResourceVersion::Version(committed.version);
        }

        let loaded = store.get_resource_events(&resource).await.unwrap();
        assert_eq!(loaded.version, ResourceVersion::Version(3));
        assert_eq!(loaded.events.len(), 4);
    }

    #[tokio::test]
    async fn test_corrupt_row_fails_whole_read() {
        let storage = InMemoryEventStorage::new();
        let store = EventStore::new(storage.clone());
        store
            .commit(&Resource::member(1), ResourceVersion::NoSuchResource, &declared(1))
            .await
            .unwrap();

        storage
            .insert_if_absent(&EventRow {
                id: "corrupt".to_string(),
                resource_id: "2".to_string(),
                resource_type: "Member".to_string(),
                resource_version: 0,
                event_type: "SuperUserDeclared".to_string(),
                payload: json!({ "member_number": "two" }),
            })
            .await
            .unwrap();

        let err = store.get_all().await.unwrap_err();
        assert!(err.is_decode_error());
        assert!(err.to_string().contains("corrupt"));

        // Other resources stay readable
        let loaded = store.get_resource_events(&Resource::member(1)).await.unwrap();
        assert_eq!(loaded.events.len(), 1);
    }
}
