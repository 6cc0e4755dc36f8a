//! Equipment Aggregate

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::domain::{DomainEvent, MemberNumber};

use super::Aggregate;

/// Decision state for one piece of equipment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquipmentState {
    pub area_id: Option<Uuid>,
    pub training_sheet_id: Option<String>,
    pub trainers: BTreeSet<MemberNumber>,
    /// Members whose training is currently in force
    pub trained: BTreeSet<MemberNumber>,
}

impl EquipmentState {
    pub fn exists(&self) -> bool {
        self.area_id.is_some()
    }

    pub fn is_trainer(&self, member_number: MemberNumber) -> bool {
        self.trainers.contains(&member_number)
    }

    pub fn is_trained(&self, member_number: MemberNumber) -> bool {
        self.trained.contains(&member_number)
    }
}

impl Aggregate for EquipmentState {
    fn apply(mut self, event: &DomainEvent) -> Self {
        match event {
            DomainEvent::EquipmentAdded { area_id, .. } => {
                self.area_id = Some(*area_id);
            }
            DomainEvent::EquipmentTrainingSheetRegistered {
                training_sheet_id, ..
            } => {
                self.training_sheet_id = Some(training_sheet_id.clone());
            }
            DomainEvent::TrainerAdded { member_number, .. } => {
                self.trainers.insert(*member_number);
            }
            DomainEvent::MemberTrainedOnEquipment { member_number, .. } => {
                self.trained.insert(*member_number);
            }
            DomainEvent::RevokeTrainedOnEquipment { member_number, .. } => {
                self.trained.remove(member_number);
            }
            DomainEvent::AreaCreated { .. }
            | DomainEvent::AreaRemoved { .. }
            | DomainEvent::OwnerAdded { .. }
            | DomainEvent::OwnerRemoved { .. }
            | DomainEvent::MemberNumberLinkedToEmail { .. }
            | DomainEvent::MemberDetailsUpdated { .. }
            | DomainEvent::MemberEmailChanged { .. }
            | DomainEvent::SuperUserDeclared { .. }
            | DomainEvent::SuperUserRevoked { .. }
            | DomainEvent::MemberRejoinedWithNewNumber { .. }
            | DomainEvent::MemberRejoinedWithExistingNumber { .. } => {}
        }
        self
    }
}
