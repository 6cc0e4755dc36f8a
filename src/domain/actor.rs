//! Actors
//!
//! Who recorded an event. Carried on every event for audit; authorization
//! decisions over actors are made by callers, not by the core.

use serde::{Deserialize, Serialize};

use super::MemberNumber;

/// The party on whose behalf a command runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "snake_case", deny_unknown_fields)]
pub enum Actor {
    /// Background jobs and imports
    System,

    /// A holder of a static API token
    Token { token: String },

    /// A signed-in member
    User {
        member_number: MemberNumber,
        email: String,
    },
}

impl Actor {
    /// Member number of a signed-in member
    pub fn member_number(&self) -> Option<MemberNumber> {
        match self {
            Actor::User { member_number, .. } => Some(*member_number),
            Actor::System | Actor::Token { .. } => None,
        }
    }
}
