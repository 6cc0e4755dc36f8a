//! In-memory event storage
//!
//! Append-only log kept in a vector. Intended for tests and local runs; it
//! honours the same conditional-insert contract as the Postgres backend.

use std::sync::{Arc, RwLock};

use crate::domain::Resource;

use super::{EventRow, EventStorage, EventStoreError};

/// Shared in-memory log. Clones see the same rows.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventStorage {
    rows: Arc<RwLock<Vec<EventRow>>>,
}

impl InMemoryEventStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows in the log
    pub fn len(&self) -> Result<usize, EventStoreError> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(rows.len())
    }

    pub fn is_empty(&self) -> Result<bool, EventStoreError> {
        Ok(self.len()? == 0)
    }
}

fn poisoned() -> EventStoreError {
    EventStoreError::Storage("in-memory event log lock poisoned".to_string())
}

impl EventStorage for InMemoryEventStorage {
    async fn insert_if_absent(&self, row: &EventRow) -> Result<u64, EventStoreError> {
        let mut rows = self.rows.write().map_err(|_| poisoned())?;

        if rows.iter().any(|existing| existing.id == row.id) {
            return Err(EventStoreError::Storage(format!(
                "duplicate event id {}",
                row.id
            )));
        }

        let occupied = rows.iter().any(|existing| {
            existing.resource_id == row.resource_id
                && existing.resource_type == row.resource_type
                && existing.resource_version == row.resource_version
        });
        if occupied {
            return Ok(0);
        }

        rows.push(row.clone());
        Ok(1)
    }

    async fn fetch_all(&self) -> Result<Vec<EventRow>, EventStoreError> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(rows.clone())
    }

    async fn fetch_resource(&self, resource: &Resource) -> Result<Vec<EventRow>, EventStoreError> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        let mut matching: Vec<EventRow> = rows
            .iter()
            .filter(|row| row.belongs_to(resource))
            .cloned()
            .collect();
        matching.sort_by_key(|row| row.resource_version);
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResourceType;
    use serde_json::json;

    fn row(id: &str, resource_id: &str, version: i64) -> EventRow {
        EventRow {
            id: id.to_string(),
            resource_id: resource_id.to_string(),
            resource_type: "Area".to_string(),
            resource_version: version,
            event_type: "AreaRemoved".to_string(),
            payload: json!({}),
        }
    }

    #[tokio::test]
    async fn test_occupied_slot_inserts_nothing() {
        let storage = InMemoryEventStorage::new();
        assert_eq!(storage.insert_if_absent(&row("a", "x", 0)).await.unwrap(), 1);
        assert_eq!(storage.insert_if_absent(&row("b", "x", 0)).await.unwrap(), 0);
        assert_eq!(storage.insert_if_absent(&row("c", "y", 0)).await.unwrap(), 1);
        assert_eq!(storage.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_a_storage_error() {
        let storage = InMemoryEventStorage::new();
        storage.insert_if_absent(&row("a", "x", 0)).await.unwrap();
        let err = storage.insert_if_absent(&row("a", "x", 1)).await.unwrap_err();
        assert!(matches!(err, EventStoreError::Storage(_)));
    }

    #[tokio::test]
    async fn test_fetch_resource_filters_and_sorts() {
        let storage = InMemoryEventStorage::new();
        storage.insert_if_absent(&row("a", "x", 1)).await.unwrap();
        storage.insert_if_absent(&row("b", "y", 0)).await.unwrap();
        storage.insert_if_absent(&row("c", "x", 0)).await.unwrap();

        let rows = storage
            .fetch_resource(&Resource::new("x", ResourceType::Area))
            .await
            .unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);

        let all = storage.fetch_all().await.unwrap();
        let ids: Vec<_> = all.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
