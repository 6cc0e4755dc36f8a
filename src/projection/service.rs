//! Projection Service
//!
//! Keeps the in-process [`ReadModel`] in step with the event log.
//! This is the "Q" side of CQRS: commands never read from here, and the state
//! can be discarded and rebuilt from the log at any time.

use tokio::sync::{Mutex, RwLock, RwLockReadGuard};

use crate::domain::MemberNumber;
use crate::event_store::{EventStorage, EventStore, EventStoreError, LoggedEvent};

use super::queries::Member;
use super::ReadModel;

/// Projection Service folding the event log into a [`ReadModel`]
#[derive(Debug)]
pub struct Projector<S> {
    store: EventStore<S>,
    state: RwLock<ReadModel>,
    /// Ids of the folded events, in log order. Holding the lock serializes
    /// refreshes.
    applied_ids: Mutex<Vec<String>>,
}

impl<S: EventStorage> Projector<S> {
    /// Create a projector with empty state; call [`Projector::rebuild`] or
    /// [`Projector::refresh`] to load the log.
    pub fn new(store: EventStore<S>) -> Self {
        Self {
            store,
            state: RwLock::new(ReadModel::new()),
            applied_ids: Mutex::new(Vec::new()),
        }
    }

    // =========================================================================
    // rebuild
    // =========================================================================

    /// Throw the current state away and fold the whole log from the start
    pub async fn rebuild(&self) -> Result<usize, ProjectionError> {
        let mut applied_ids = self.applied_ids.lock().await;
        let log = self.store.get_all_logged().await?;
        Ok(self.rebuild_from(&mut applied_ids, log).await)
    }

    async fn rebuild_from(&self, applied_ids: &mut Vec<String>, log: Vec<LoggedEvent>) -> usize {
        let fresh = ReadModel::from_events(log.iter().map(|logged| &logged.event));
        let applied = fresh.applied();

        *self.state.write().await = fresh;
        *applied_ids = log.into_iter().map(|logged| logged.id).collect();

        tracing::info!(events_applied = applied, "Read model rebuilt");
        applied
    }

    // =========================================================================
    // refresh
    // =========================================================================

    /// Fold only the events committed since the last refresh.
    ///
    /// Returns how many events were applied. The log read must still start
    /// with the events already folded, in the same order. If it does not
    /// (the log shrank, or a row became visible behind rows already folded)
    /// the state is rebuilt instead and the full count is returned.
    pub async fn refresh(&self) -> Result<usize, ProjectionError> {
        let mut applied_ids = self.applied_ids.lock().await;
        let log = self.store.get_all_logged().await?;

        if log.len() < applied_ids.len() {
            tracing::warn!(
                log_length = log.len(),
                already_applied = applied_ids.len(),
                "Event log shrank, rebuilding read model"
            );
            return Ok(self.rebuild_from(&mut applied_ids, log).await);
        }

        let diverged_at = log
            .iter()
            .zip(applied_ids.iter())
            .position(|(logged, applied)| logged.id != *applied);
        if let Some(position) = diverged_at {
            tracing::warn!(
                position,
                already_applied = applied_ids.len(),
                "Event log prefix changed, rebuilding read model"
            );
            return Ok(self.rebuild_from(&mut applied_ids, log).await);
        }

        let new_events = &log[applied_ids.len()..];
        let mut state = self.state.write().await;
        state.apply_all(new_events.iter().map(|logged| &logged.event));
        applied_ids.extend(new_events.iter().map(|logged| logged.id.clone()));

        if !new_events.is_empty() {
            tracing::debug!(
                events_applied = new_events.len(),
                total = state.applied(),
                "Read model refreshed"
            );
        }

        Ok(new_events.len())
    }

    // =========================================================================
    // queries
    // =========================================================================

    /// Read access to the current state
    pub async fn read(&self) -> RwLockReadGuard<'_, ReadModel> {
        self.state.read().await
    }

    /// Merged view of a member, by any of their numbers
    pub async fn member(&self, member_number: MemberNumber) -> Option<Member> {
        self.state.read().await.members().get(member_number)
    }

    /// Number of events folded so far
    pub async fn applied(&self) -> usize {
        self.state.read().await.applied()
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> ReadModel {
        self.state.read().await.clone()
    }
}

/// Projection errors
#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error(transparent)]
    EventStore(#[from] EventStoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_error_display() {
        let err = ProjectionError::from(EventStoreError::Storage("offline".to_string()));
        assert_eq!(err.to_string(), "Storage error: offline");
    }
}
