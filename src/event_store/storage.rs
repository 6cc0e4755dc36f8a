//! Storage port
//!
//! The narrow interface the event store needs from a backend. Production runs
//! on Postgres; tests and local runs use the in-memory adapter.

use std::future::Future;

use crate::domain::Resource;

use super::EventStoreError;

/// One row of the events table
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    /// Opaque unique identifier
    pub id: String,
    pub resource_id: String,
    pub resource_type: String,
    pub resource_version: i64,
    pub event_type: String,
    /// Every event field except `type`
    pub payload: serde_json::Value,
}

impl EventRow {
    pub fn belongs_to(&self, resource: &Resource) -> bool {
        self.resource_id == resource.id && self.resource_type == resource.resource_type.as_str()
    }
}

/// Backend holding the append-only event log
pub trait EventStorage: Send + Sync {
    /// Insert `row` unless a row already occupies its
    /// `(resource_id, resource_type, resource_version)` slot.
    ///
    /// Returns the number of rows inserted. The check and the insert must be a
    /// single atomic operation.
    fn insert_if_absent(
        &self,
        row: &EventRow,
    ) -> impl Future<Output = Result<u64, EventStoreError>> + Send;

    /// Every row, in insertion order
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<EventRow>, EventStoreError>> + Send;

    /// Rows of one resource, in increasing `resource_version` order
    fn fetch_resource(
        &self,
        resource: &Resource,
    ) -> impl Future<Output = Result<Vec<EventRow>, EventStoreError>> + Send;
}
