//! Area Aggregate

use std::collections::BTreeSet;

use crate::domain::{DomainEvent, MemberNumber};

use super::Aggregate;

/// Whether an area currently exists, and who owns it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaState {
    pub exists: bool,
    pub name: Option<String>,
    pub owners: BTreeSet<MemberNumber>,
}

impl AreaState {
    pub fn is_owner(&self, member_number: MemberNumber) -> bool {
        self.owners.contains(&member_number)
    }
}

impl Aggregate for AreaState {
    fn apply(mut self, event: &DomainEvent) -> Self {
        match event {
            DomainEvent::AreaCreated { name, .. } => {
                self.exists = true;
                self.name = Some(name.clone());
            }
            DomainEvent::AreaRemoved { .. } => {
                self = Self::default();
            }
            DomainEvent::OwnerAdded { member_number, .. } => {
                self.owners.insert(*member_number);
            }
            DomainEvent::OwnerRemoved { member_number, .. } => {
                self.owners.remove(member_number);
            }
            DomainEvent::EquipmentAdded { .. }
            | DomainEvent::EquipmentTrainingSheetRegistered { .. }
            | DomainEvent::TrainerAdded { .. }
            | DomainEvent::MemberTrainedOnEquipment { .. }
            | DomainEvent::RevokeTrainedOnEquipment { .. }
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
