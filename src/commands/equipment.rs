//! Equipment and training commands

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{Aggregate, EquipmentState};
use crate::domain::{DomainError, DomainEvent, MemberNumber, Resource};

use super::{Command, ProcessInput};

/// Add a piece of equipment to an area
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddEquipment {
    pub id: Uuid,
    pub name: String,
    pub area_id: Uuid,
}

impl Command for AddEquipment {
    const NAME: &'static str = "AddEquipment";

    fn resource(&self) -> Resource {
        Resource::equipment(self.id)
    }

    fn validate(&self) -> Result<(), DomainError> {
        DomainError::require_text("name", &self.name).map(|_| ())
    }

    fn process(input: ProcessInput<'_, Self>) -> Option<DomainEvent> {
        if EquipmentState::replay(input.events).exists() {
            return None;
        }
        Some(DomainEvent::EquipmentAdded {
            id: input.command.id,
            name: input.command.name.trim().to_string(),
            area_id: input.command.area_id,
            recorded_by: input.actor.clone(),
            recorded_at: input.now,
        })
    }
}

/// Attach a training quiz sheet to a piece of equipment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterTrainingSheet {
    pub equipment_id: Uuid,
    pub training_sheet_id: String,
}

impl Command for RegisterTrainingSheet {
    const NAME: &'static str = "RegisterTrainingSheet";

    fn resource(&self) -> Resource {
        Resource::equipment(self.equipment_id)
    }

    fn validate(&self) -> Result<(), DomainError> {
        DomainError::require_text("training_sheet_id", &self.training_sheet_id).map(|_| ())
    }

    fn process(input: ProcessInput<'_, Self>) -> Option<DomainEvent> {
        let equipment = EquipmentState::replay(input.events);
        let sheet = input.command.training_sheet_id.trim();
        if !equipment.exists() || equipment.training_sheet_id.as_deref() == Some(sheet) {
            return None;
        }
        Some(DomainEvent::EquipmentTrainingSheetRegistered {
            equipment_id: input.command.equipment_id,
            training_sheet_id: sheet.to_string(),
            recorded_by: input.actor.clone(),
            recorded_at: input.now,
        })
    }
}

/// Let a member train others on a piece of equipment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddTrainer {
    pub equipment_id: Uuid,
    pub member_number: MemberNumber,
}

impl Command for AddTrainer {
    const NAME: &'static str = "AddTrainer";

    fn resource(&self) -> Resource {
        Resource::equipment(self.equipment_id)
    }

    fn process(input: ProcessInput<'_, Self>) -> Option<DomainEvent> {
        let equipment = EquipmentState::replay(input.events);
        if !equipment.exists() || equipment.is_trainer(input.command.member_number) {
            return None;
        }
        Some(DomainEvent::TrainerAdded {
            equipment_id: input.command.equipment_id,
            member_number: input.command.member_number,
            recorded_by: input.actor.clone(),
            recorded_at: input.now,
        })
    }
}

/// Record that a member has been trained
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkMemberTrained {
    pub equipment_id: Uuid,
    pub member_number: MemberNumber,
    #[serde(default)]
    pub trained_by: Option<MemberNumber>,
}

impl Command for MarkMemberTrained {
    const NAME: &'static str = "MarkMemberTrained";

    fn resource(&self) -> Resource {
        Resource::equipment(self.equipment_id)
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.trained_by == Some(self.member_number) {
            return Err(DomainError::BusinessRuleViolation(
                "members cannot train themselves".to_string(),
            ));
        }
        Ok(())
    }

    fn process(input: ProcessInput<'_, Self>) -> Option<DomainEvent> {
        let equipment = EquipmentState::replay(input.events);
        if !equipment.exists() || equipment.is_trained(input.command.member_number) {
            return None;
        }
        Some(DomainEvent::MemberTrainedOnEquipment {
            equipment_id: input.command.equipment_id,
            member_number: input.command.member_number,
            trained_by: input.command.trained_by,
            recorded_by: input.actor.clone(),
            recorded_at: input.now,
        })
    }
}

/// Withdraw a member's training
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RevokeMemberTrained {
    pub equipment_id: Uuid,
    pub member_number: MemberNumber,
}

impl Command for RevokeMemberTrained {
    const NAME: &'static str = "RevokeMemberTrained";

    fn resource(&self) -> Resource {
        Resource::equipment(self.equipment_id)
    }

    fn process(input: ProcessInput<'_, Self>) -> Option<DomainEvent> {
        if !EquipmentState::replay(input.events).is_trained(input.command.member_number) {
            return None;
        }
        Some(DomainEvent::RevokeTrainedOnEquipment {
            equipment_id: input.command.equipment_id,
            member_number: input.command.member_number,
            recorded_by: input.actor.clone(),
            recorded_at: input.now,
        })
    }
}
