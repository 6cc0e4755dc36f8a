//! Member commands
//!
//! Profile changes live on the member's own stream. Super-user changes and
//! rejoins live on the global stream.

use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, GlobalState, MemberState};
use crate::domain::{normalise_email, DomainError, DomainEvent, MemberNumber, Resource};

use super::{Command, ProcessInput};

fn optional_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Link a member number to its primary email
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkNumberToEmail {
    pub member_number: MemberNumber,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub form_of_address: Option<String>,
}

impl Command for LinkNumberToEmail {
    const NAME: &'static str = "LinkNumberToEmail";

    fn resource(&self) -> Resource {
        Resource::member(self.member_number)
    }

    fn validate(&self) -> Result<(), DomainError> {
        normalise_email(&self.email).map(|_| ())
    }

    fn process(input: ProcessInput<'_, Self>) -> Option<DomainEvent> {
        let email = normalise_email(&input.command.email).ok()?;
        let member = MemberState::replay(input.events);
        if member.email.as_deref() == Some(email.as_str()) {
            return None;
        }
        Some(DomainEvent::MemberNumberLinkedToEmail {
            member_number: input.command.member_number,
            email,
            name: optional_text(&input.command.name),
            form_of_address: optional_text(&input.command.form_of_address),
            recorded_by: input.actor.clone(),
            recorded_at: input.now,
        })
    }
}

/// Change a member's display name or pronouns
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMemberDetails {
    pub member_number: MemberNumber,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pronouns: Option<String>,
}

impl Command for UpdateMemberDetails {
    const NAME: &'static str = "UpdateMemberDetails";

    fn resource(&self) -> Resource {
        Resource::member(self.member_number)
    }

    fn validate(&self) -> Result<(), DomainError> {
        if optional_text(&self.name).is_none() && optional_text(&self.pronouns).is_none() {
            return Err(DomainError::BusinessRuleViolation(
                "name or pronouns must be given".to_string(),
            ));
        }
        Ok(())
    }

    fn process(input: ProcessInput<'_, Self>) -> Option<DomainEvent> {
        let member = MemberState::replay(input.events);
        let name = optional_text(&input.command.name).filter(|n| member.name.as_ref() != Some(n));
        let pronouns =
            optional_text(&input.command.pronouns).filter(|p| member.pronouns.as_ref() != Some(p));
        if name.is_none() && pronouns.is_none() {
            return None;
        }
        Some(DomainEvent::MemberDetailsUpdated {
            member_number: input.command.member_number,
            name,
            pronouns,
            recorded_by: input.actor.clone(),
            recorded_at: input.now,
        })
    }
}

/// Replace a linked member's primary email
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangeMemberEmail {
    pub member_number: MemberNumber,
    pub new_email: String,
}

impl Command for ChangeMemberEmail {
    const NAME: &'static str = "ChangeMemberEmail";

    fn resource(&self) -> Resource {
        Resource::member(self.member_number)
    }

    fn validate(&self) -> Result<(), DomainError> {
        normalise_email(&self.new_email).map(|_| ())
    }

    fn process(input: ProcessInput<'_, Self>) -> Option<DomainEvent> {
        let new_email = normalise_email(&input.command.new_email).ok()?;
        let current = MemberState::replay(input.events).email?;
        if current == new_email {
            return None;
        }
        Some(DomainEvent::MemberEmailChanged {
            member_number: input.command.member_number,
            new_email,
            recorded_by: input.actor.clone(),
            recorded_at: input.now,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclareSuperUser {
    pub member_number: MemberNumber,
}

impl Command for DeclareSuperUser {
    const NAME: &'static str = "DeclareSuperUser";

    fn resource(&self) -> Resource {
        Resource::global()
    }

    fn process(input: ProcessInput<'_, Self>) -> Option<DomainEvent> {
        if GlobalState::replay(input.events).is_super_user(input.command.member_number) {
            return None;
        }
        Some(DomainEvent::SuperUserDeclared {
            member_number: input.command.member_number,
            recorded_by: input.actor.clone(),
            recorded_at: input.now,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RevokeSuperUser {
    pub member_number: MemberNumber,
}

impl Command for RevokeSuperUser {
    const NAME: &'static str = "RevokeSuperUser";

    fn resource(&self) -> Resource {
        Resource::global()
    }

    fn process(input: ProcessInput<'_, Self>) -> Option<DomainEvent> {
        if !GlobalState::replay(input.events).is_super_user(input.command.member_number) {
            return None;
        }
        Some(DomainEvent::SuperUserRevoked {
            member_number: input.command.member_number,
            recorded_by: input.actor.clone(),
            recorded_at: input.now,
        })
    }
}

/// Record that a former member came back under a new number
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordRejoinWithNewNumber {
    pub old_member_number: MemberNumber,
    pub new_member_number: MemberNumber,
}

impl Command for RecordRejoinWithNewNumber {
    const NAME: &'static str = "RecordRejoinWithNewNumber";

    fn resource(&self) -> Resource {
        Resource::global()
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.old_member_number == self.new_member_number {
            return Err(DomainError::BusinessRuleViolation(
                "old and new member numbers must differ".to_string(),
            ));
        }
        Ok(())
    }

    fn process(input: ProcessInput<'_, Self>) -> Option<DomainEvent> {
        let pair = (input.command.old_member_number, input.command.new_member_number);
        if GlobalState::replay(input.events).rejoins.contains(&pair) {
            return None;
        }
        Some(DomainEvent::MemberRejoinedWithNewNumber {
            old_member_number: pair.0,
            new_member_number: pair.1,
            recorded_by: input.actor.clone(),
            recorded_at: input.now,
        })
    }
}

/// Record that a former member came back keeping their number
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordRejoinWithExistingNumber {
    pub member_number: MemberNumber,
}

impl Command for RecordRejoinWithExistingNumber {
    const NAME: &'static str = "RecordRejoinWithExistingNumber";

    fn resource(&self) -> Resource {
        Resource::global()
    }

    // A member may rejoin more than once, so every rejoin is recorded.
    fn process(input: ProcessInput<'_, Self>) -> Option<DomainEvent> {
        Some(DomainEvent::MemberRejoinedWithExistingNumber {
            member_number: input.command.member_number,
            recorded_by: input.actor.clone(),
            recorded_at: input.now,
        })
    }
}
