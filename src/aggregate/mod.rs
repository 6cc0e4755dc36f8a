//! Aggregate module
//!
//! Decision state for commands, folded from one resource's events. Commands
//! consult these to decide whether anything would change; the read model is
//! never used for decisions.

pub mod area;
pub mod equipment;
pub mod global;
pub mod member;

pub use area::AreaState;
pub use equipment::EquipmentState;
pub use global::GlobalState;
pub use member::MemberState;

use crate::domain::DomainEvent;

/// Aggregate trait that all decision states implement
pub trait Aggregate: Sized + Default {
    /// Apply an event to update the aggregate state
    fn apply(self, event: &DomainEvent) -> Self;

    /// Fold a resource's history from the beginning
    fn replay(events: &[DomainEvent]) -> Self {
        events.iter().fold(Self::default(), Self::apply)
    }
}
