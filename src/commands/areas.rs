//! Area commands

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{Aggregate, AreaState};
use crate::domain::{DomainError, DomainEvent, MemberNumber, Resource};

use super::{Command, ProcessInput};

/// Create a new area of the workshop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateArea {
    pub id: Uuid,
    pub name: String,
}

impl Command for CreateArea {
    const NAME: &'static str = "CreateArea";

    fn resource(&self) -> Resource {
        Resource::area(self.id)
    }

    fn validate(&self) -> Result<(), DomainError> {
        DomainError::require_text("name", &self.name).map(|_| ())
    }

    fn process(input: ProcessInput<'_, Self>) -> Option<DomainEvent> {
        if AreaState::replay(input.events).exists {
            return None;
        }
        Some(DomainEvent::AreaCreated {
            id: input.command.id,
            name: input.command.name.trim().to_string(),
            recorded_by: input.actor.clone(),
            recorded_at: input.now,
        })
    }
}

/// Remove an area
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoveArea {
    pub id: Uuid,
}

impl Command for RemoveArea {
    const NAME: &'static str = "RemoveArea";

    fn resource(&self) -> Resource {
        Resource::area(self.id)
    }

    fn process(input: ProcessInput<'_, Self>) -> Option<DomainEvent> {
        if !AreaState::replay(input.events).exists {
            return None;
        }
        Some(DomainEvent::AreaRemoved {
            id: input.command.id,
            recorded_by: input.actor.clone(),
            recorded_at: input.now,
        })
    }
}

/// Make a member an owner of an area
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddOwner {
    pub area_id: Uuid,
    pub member_number: MemberNumber,
}

impl Command for AddOwner {
    const NAME: &'static str = "AddOwner";

    fn resource(&self) -> Resource {
        Resource::area(self.area_id)
    }

    fn process(input: ProcessInput<'_, Self>) -> Option<DomainEvent> {
        let area = AreaState::replay(input.events);
        if !area.exists || area.is_owner(input.command.member_number) {
            return None;
        }
        Some(DomainEvent::OwnerAdded {
            area_id: input.command.area_id,
            member_number: input.command.member_number,
            recorded_by: input.actor.clone(),
            recorded_at: input.now,
        })
    }
}

/// Stop a member owning an area
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoveOwner {
    pub area_id: Uuid,
    pub member_number: MemberNumber,
}

impl Command for RemoveOwner {
    const NAME: &'static str = "RemoveOwner";

    fn resource(&self) -> Resource {
        Resource::area(self.area_id)
    }

    fn process(input: ProcessInput<'_, Self>) -> Option<DomainEvent> {
        if !AreaState::replay(input.events).is_owner(input.command.member_number) {
            return None;
        }
        Some(DomainEvent::OwnerRemoved {
            area_id: input.command.area_id,
            member_number: input.command.member_number,
            recorded_by: input.actor.clone(),
            recorded_at: input.now,
        })
    }
}
