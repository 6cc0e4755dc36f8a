//! Event Store Repository
//!
//! Core implementation of the Event Store pattern.
//! Provides event persistence with optimistic concurrency control: every
//! commit names the version it was decided against and claims the next slot
//! with a single conditional insert.

use uuid::Uuid;

use crate::domain::{DomainEvent, Resource, ResourceVersion};

use super::{EventRow, EventStorage, EventStoreError};

/// Result of a successful commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed {
    pub event_id: String,
    pub version: i64,
}

/// Event Store for persisting and retrieving events
#[derive(Debug, Clone)]
pub struct EventStore<S> {
    storage: S,
}

impl<S: EventStorage> EventStore<S> {
    /// Create a new EventStore over a storage backend
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    // =========================================================================
    // commit
    // =========================================================================

    /// Append `event` to `resource`, provided nobody else has committed since
    /// `last_known_version` was read.
    ///
    /// A lost race returns [`EventStoreError::ConcurrencyConflict`]; the store
    /// never retries on its own.
    pub async fn commit(
        &self,
        resource: &Resource,
        last_known_version: ResourceVersion,
        event: &DomainEvent,
    ) -> Result<Committed, EventStoreError> {
        let encoded = event.encode()?;
        let row = EventRow {
            id: Uuid::new_v4().to_string(),
            resource_id: resource.id.clone(),
            resource_type: resource.resource_type.as_str().to_string(),
            resource_version: last_known_version.next(),
            event_type: encoded.event_type,
            payload: encoded.payload,
        };

        match self.storage.insert_if_absent(&row).await? {
            1 => {
                tracing::debug!(
                    resource = %resource,
                    version = row.resource_version,
                    event_type = %row.event_type,
                    event_id = %row.id,
                    "Event committed"
                );
                Ok(Committed {
                    event_id: row.id,
                    version: row.resource_version,
                })
            }
            0 => {
                tracing::warn!(
                    resource = %resource,
                    expected = %last_known_version,
                    event_type = %row.event_type,
                    "Concurrency conflict on commit"
                );
                Err(EventStoreError::ConcurrencyConflict {
                    resource: resource.clone(),
                    expected: last_known_version,
                })
            }
            n => Err(EventStoreError::UnexpectedRowCount(n)),
        }
    }
}
