//! Common test utilities

#![allow(dead_code)]

use chrono::Utc;
use member_ledger::{Actor, DomainEvent, MemberNumber};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

/// Connect to the test database and make sure the schema exists.
///
/// Returns `None` when `DATABASE_URL` is unset so Postgres tests can skip.
/// Tests use fresh resource ids instead of truncating, so they can share the
/// database while running in parallel.
pub async fn setup_test_db() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    member_ledger::db::ensure_schema(&pool)
        .await
        .expect("Failed to create schema");

    Some(pool)
}

pub fn area_created(id: Uuid, name: &str) -> DomainEvent {
    DomainEvent::AreaCreated {
        id,
        name: name.to_string(),
        recorded_by: Actor::System,
        recorded_at: Utc::now(),
    }
}

pub fn equipment_added(id: Uuid, area_id: Uuid, name: &str) -> DomainEvent {
    DomainEvent::EquipmentAdded {
        id,
        name: name.to_string(),
        area_id,
        recorded_by: Actor::System,
        recorded_at: Utc::now(),
    }
}

pub fn linked(member_number: MemberNumber, email: &str) -> DomainEvent {
    DomainEvent::MemberNumberLinkedToEmail {
        member_number,
        email: email.to_string(),
        name: None,
        form_of_address: None,
        recorded_by: Actor::System,
        recorded_at: Utc::now(),
    }
}

/// Commit each event to its own resource, reading the current version first
pub async fn commit_all<S>(store: &member_ledger::EventStore<S>, events: &[DomainEvent])
where
    S: member_ledger::event_store::EventStorage,
{
    for event in events {
        let resource = event.resource();
        let current = store
            .get_resource_events(&resource)
            .await
            .expect("Failed to load resource");
        store
            .commit(&resource, current.version, event)
            .await
            .expect("Failed to commit event");
    }
}
