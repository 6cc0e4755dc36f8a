//! Event Store module
//!
//! Persistence layer for Event Sourcing: the append-only log, optimistic
//! commits, and replay. Backends plug in through [`EventStorage`].

mod error;
mod in_memory;
mod postgres;
mod reader;
mod repository;
mod storage;

pub use error::EventStoreError;
pub use in_memory::InMemoryEventStorage;
pub use postgres::PgEventStorage;
pub use reader::{LoggedEvent, ResourceEvents};
pub use repository::{Committed, EventStore};
pub use storage::{EventRow, EventStorage};
