//! Commands
//!
//! Each command names the resource it changes and decides, from that
//! resource's history, which event (if any) to record.

mod pipeline;

pub mod areas;
pub mod equipment;
pub mod members;

pub use areas::{AddOwner, CreateArea, RemoveArea, RemoveOwner};
pub use equipment::{
    AddEquipment, AddTrainer, MarkMemberTrained, RegisterTrainingSheet, RevokeMemberTrained,
};
pub use members::{
    ChangeMemberEmail, DeclareSuperUser, LinkNumberToEmail, RecordRejoinWithExistingNumber,
    RecordRejoinWithNewNumber, RevokeSuperUser, UpdateMemberDetails,
};
pub use pipeline::{decode_command, Command, CommandOutcome, CommandPipeline, ProcessInput};
