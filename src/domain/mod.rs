//! Domain module
//!
//! Core domain types: events, resources, actors and validation rules.

pub mod actor;
pub mod email;
pub mod error;
pub mod events;
pub mod resource;

pub use actor::Actor;
pub use email::{gravatar_hash, normalise_email};
pub use error::DomainError;
pub use events::{DecodeError, DomainEvent, EncodedEvent};
pub use resource::{Resource, ResourceType, ResourceVersion};

/// Membership number issued by the organisation
pub type MemberNumber = u64;
