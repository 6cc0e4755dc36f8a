//! Database module
//!
//! Schema bootstrap and connectivity checks.

use sqlx::PgPool;

const CREATE_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS events (
    position BIGSERIAL NOT NULL,
    id TEXT PRIMARY KEY,
    resource_id TEXT NOT NULL,
    resource_type TEXT NOT NULL,
    resource_version BIGINT NOT NULL CHECK (resource_version >= 0),
    event_type TEXT NOT NULL,
    payload JSONB NOT NULL,
    UNIQUE (resource_id, resource_type, resource_version)
)
"#;

const CREATE_POSITION_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS events_position_idx ON events (position)";

/// Create the events table if it does not exist
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_EVENTS_TABLE).execute(pool).await?;
    sqlx::query(CREATE_POSITION_INDEX).execute(pool).await?;
    tracing::debug!("Events schema ensured");
    Ok(())
}

/// Simple connectivity check
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM information_schema.tables
            WHERE table_schema = 'public' AND table_name = $1
        )
        "#,
    )
    .bind("events")
    .fetch_one(pool)
    .await?;

    if !exists {
        tracing::error!("Required table 'events' does not exist");
    }

    Ok(exists)
}
