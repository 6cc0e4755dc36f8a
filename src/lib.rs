//! member_ledger Library
//!
//! Event-sourced membership, equipment and training records.

pub mod aggregate;
pub mod commands;
pub mod config;
pub mod db;
pub mod domain;
pub mod event_store;
pub mod jobs;
pub mod projection;

mod error;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use domain::{Actor, DomainError, DomainEvent, MemberNumber, Resource, ResourceVersion};
pub use event_store::{EventStore, EventStoreError, InMemoryEventStorage, PgEventStorage};
pub use projection::{Projector, ReadModel};
