//! Member Aggregate
//!
//! Profile state of a single member number.

use crate::domain::DomainEvent;

use super::Aggregate;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberState {
    /// Current primary email; `None` until the number is linked
    pub email: Option<String>,
    pub name: Option<String>,
    pub pronouns: Option<String>,
}

impl MemberState {
    pub fn is_linked(&self) -> bool {
        self.email.is_some()
    }
}

impl Aggregate for MemberState {
    fn apply(mut self, event: &DomainEvent) -> Self {
        match event {
            DomainEvent::MemberNumberLinkedToEmail { email, name, .. } => {
                self.email = Some(email.clone());
                if name.is_some() {
                    self.name = name.clone();
                }
            }
            DomainEvent::MemberDetailsUpdated { name, pronouns, .. } => {
                if name.is_some() {
                    self.name = name.clone();
                }
                if pronouns.is_some() {
                    self.pronouns = pronouns.clone();
                }
            }
            DomainEvent::MemberEmailChanged { new_email, .. } => {
                self.email = Some(new_email.clone());
            }
            DomainEvent::AreaCreated { .. }
            | DomainEvent::AreaRemoved { .. }
            | DomainEvent::OwnerAdded { .. }
            | DomainEvent::OwnerRemoved { .. }
            | DomainEvent::EquipmentAdded { .. }
            | DomainEvent::EquipmentTrainingSheetRegistered { .. }
            | DomainEvent::TrainerAdded { .. }
            | DomainEvent::MemberTrainedOnEquipment { .. }
            | DomainEvent::RevokeTrainedOnEquipment { .. }
            | DomainEvent::SuperUserDeclared { .. }
            | DomainEvent::SuperUserRevoked { .. }
            | DomainEvent::MemberRejoinedWithNewNumber { .. }
            | DomainEvent::MemberRejoinedWithExistingNumber { .. } => {}
        }
        self
    }
}
