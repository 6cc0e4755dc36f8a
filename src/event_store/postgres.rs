//! Postgres event storage
//!
//! Persistence of the event log in the `events` table. The conditional insert
//! relies on the `(resource_id, resource_type, resource_version)` unique
//! constraint created by [`crate::db::ensure_schema`]. Appends take a
//! transaction-scoped advisory lock so rows become visible in `position`
//! order.

use sqlx::PgPool;

use crate::domain::Resource;

use super::{EventRow, EventStorage, EventStoreError};

/// Advisory lock key held while appending to the log
const EVENT_LOG_APPEND_LOCK: i64 = 0x6d65_6d62_6572;

type EventRowTuple = (String, String, String, i64, String, serde_json::Value);

/// Event log backed by a Postgres pool
#[derive(Debug, Clone)]
pub struct PgEventStorage {
    pool: PgPool,
}

impl PgEventStorage {
    /// Create a new PgEventStorage with a database pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn into_row(
    (id, resource_id, resource_type, resource_version, event_type, payload): EventRowTuple,
) -> EventRow {
    EventRow {
        id,
        resource_id,
        resource_type,
        resource_version,
        event_type,
        payload,
    }
}

impl EventStorage for PgEventStorage {
    async fn insert_if_absent(&self, row: &EventRow) -> Result<u64, EventStoreError> {
        let mut tx = self.pool.begin().await?;

        // Keeps `position` order equal to commit order.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(EVENT_LOG_APPEND_LOCK)
            .execute(&mut *tx)
            .await?;

        let rows_affected = sqlx::query(
            r#"
            INSERT INTO events (
                id, resource_id, resource_type, resource_version, event_type, payload
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (resource_id, resource_type, resource_version) DO NOTHING
            "#,
        )
        .bind(&row.id)
        .bind(&row.resource_id)
        .bind(&row.resource_type)
        .bind(row.resource_version)
        .bind(&row.event_type)
        .bind(&row.payload)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        Ok(rows_affected)
    }

    async fn fetch_all(&self) -> Result<Vec<EventRow>, EventStoreError> {
        let rows = sqlx::query_as::<_, EventRowTuple>(
            r#"
            SELECT id, resource_id, resource_type, resource_version, event_type, payload
            FROM events
            ORDER BY position ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(into_row)
        .collect();

        Ok(rows)
    }

    async fn fetch_resource(&self, resource: &Resource) -> Result<Vec<EventRow>, EventStoreError> {
        let rows = sqlx::query_as::<_, EventRowTuple>(
            r#"
            SELECT id, resource_id, resource_type, resource_version, event_type, payload
            FROM events
            WHERE resource_id = $1 AND resource_type = $2
            ORDER BY resource_version ASC
            "#,
        )
        .bind(&resource.id)
        .bind(resource.resource_type.as_str())
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(into_row)
        .collect();

        Ok(rows)
    }
}
