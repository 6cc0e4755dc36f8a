//! Global Aggregate
//!
//! The singleton stream holding privilege changes and rejoins. They share a
//! stream because a rejoin revokes super-user status.

use std::collections::BTreeSet;

use crate::domain::{DomainEvent, MemberNumber};

use super::Aggregate;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalState {
    pub super_users: BTreeSet<MemberNumber>,
    /// Recorded (old, new) number pairs
    pub rejoins: BTreeSet<(MemberNumber, MemberNumber)>,
}

impl GlobalState {
    pub fn is_super_user(&self, member_number: MemberNumber) -> bool {
        self.super_users.contains(&member_number)
    }
}

impl Aggregate for GlobalState {
    fn apply(mut self, event: &DomainEvent) -> Self {
        match event {
            DomainEvent::SuperUserDeclared { member_number, .. } => {
                self.super_users.insert(*member_number);
            }
            DomainEvent::SuperUserRevoked { member_number, .. }
            | DomainEvent::MemberRejoinedWithExistingNumber { member_number, .. } => {
                self.super_users.remove(member_number);
            }
            DomainEvent::MemberRejoinedWithNewNumber {
                old_member_number,
                new_member_number,
                ..
            } => {
                self.super_users.remove(old_member_number);
                self.super_users.remove(new_member_number);
                self.rejoins.insert((*old_member_number, *new_member_number));
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
            | DomainEvent::MemberNumberLinkedToEmail { .. }
            | DomainEvent::MemberDetailsUpdated { .. }
            | DomainEvent::MemberEmailChanged { .. } => {}
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Actor;
    use chrono::Utc;

    #[test]
    fn test_rejoin_revokes_super_user() {
        let events = vec![
            DomainEvent::SuperUserDeclared { member_number: 4, recorded_by: Actor::System, recorded_at: Utc::now() },
            DomainEvent::SuperUserDeclared { member_number: 9, recorded_by: Actor::System, recorded_at: Utc::now() },
            DomainEvent::MemberRejoinedWithNewNumber { old_member_number: 4, new_member_number: 40, recorded_by: Actor::System, recorded_at: Utc::now() },
        ];
        let state = GlobalState::replay(&events);
        assert!(!state.is_super_user(4));
        assert!(state.is_super_user(9));
        assert!(state.rejoins.contains(&(4, 40)));
    }
}
