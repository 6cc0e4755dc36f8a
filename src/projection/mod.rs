//! Projection module
//!
//! Derived read models folded from the event log, and the member-number
//! linking used to merge identities at query time.

mod linking;
mod queries;
mod read_model;
mod service;

pub use linking::MemberLinking;
pub use queries::{Area, Areas, Equipment, EquipmentQueries, Member, Members, TrainedOn};
pub use read_model::{
    AreaRow, EquipmentRow, MemberRow, ReadModel, TrainedRow, TRAINING_REDELIVERY_WINDOW_MS,
};
pub use service::{ProjectionError, Projector};
