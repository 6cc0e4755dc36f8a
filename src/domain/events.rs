//! Domain Events
//!
//! Event definitions for the membership ledger.
//! Events are immutable facts that have happened in the system; the event log
//! is the only source of truth and everything else is folded from it.
//!
//! The codec in this module splits an event into the `event_type` column and a
//! `payload` object (all remaining fields), and joins them back on read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{Actor, MemberNumber, Resource};

/// Every fact the ledger records.
///
/// Unknown or extra fields are rejected when decoding, so a payload matches
/// exactly one variant or none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", deny_unknown_fields)]
pub enum DomainEvent {
    /// A new area of the workshop was created
    AreaCreated {
        id: Uuid,
        name: String,
        recorded_by: Actor,
        recorded_at: DateTime<Utc>,
    },

    /// An area was removed, along with its owners and trainers
    AreaRemoved {
        id: Uuid,
        recorded_by: Actor,
        recorded_at: DateTime<Utc>,
    },

    /// A member became an owner of an area
    OwnerAdded {
        area_id: Uuid,
        member_number: MemberNumber,
        recorded_by: Actor,
        recorded_at: DateTime<Utc>,
    },

    /// A member stopped being an owner of an area
    OwnerRemoved {
        area_id: Uuid,
        member_number: MemberNumber,
        recorded_by: Actor,
        recorded_at: DateTime<Utc>,
    },

    /// A piece of equipment was added to an area
    EquipmentAdded {
        id: Uuid,
        name: String,
        area_id: Uuid,
        recorded_by: Actor,
        recorded_at: DateTime<Utc>,
    },

    /// A training quiz sheet was attached to a piece of equipment
    EquipmentTrainingSheetRegistered {
        equipment_id: Uuid,
        training_sheet_id: String,
        recorded_by: Actor,
        recorded_at: DateTime<Utc>,
    },

    /// A member may now train others on a piece of equipment
    TrainerAdded {
        equipment_id: Uuid,
        member_number: MemberNumber,
        recorded_by: Actor,
        recorded_at: DateTime<Utc>,
    },

    /// A member was trained on a piece of equipment
    MemberTrainedOnEquipment {
        equipment_id: Uuid,
        member_number: MemberNumber,
        trained_by: Option<MemberNumber>,
        recorded_by: Actor,
        recorded_at: DateTime<Utc>,
    },

    /// A member's training on a piece of equipment was withdrawn
    RevokeTrainedOnEquipment {
        equipment_id: Uuid,
        member_number: MemberNumber,
        recorded_by: Actor,
        recorded_at: DateTime<Utc>,
    },

    /// A member number was registered against an email address
    MemberNumberLinkedToEmail {
        member_number: MemberNumber,
        email: String,
        name: Option<String>,
        form_of_address: Option<String>,
        recorded_by: Actor,
        recorded_at: DateTime<Utc>,
    },

    /// A member edited their profile
    MemberDetailsUpdated {
        member_number: MemberNumber,
        name: Option<String>,
        pronouns: Option<String>,
        recorded_by: Actor,
        recorded_at: DateTime<Utc>,
    },

    /// A member's primary email changed
    MemberEmailChanged {
        member_number: MemberNumber,
        new_email: String,
        recorded_by: Actor,
        recorded_at: DateTime<Utc>,
    },

    /// A member was granted super-user rights
    SuperUserDeclared {
        member_number: MemberNumber,
        recorded_by: Actor,
        recorded_at: DateTime<Utc>,
    },

    /// A member's super-user rights were withdrawn
    SuperUserRevoked {
        member_number: MemberNumber,
        recorded_by: Actor,
        recorded_at: DateTime<Utc>,
    },

    /// A former member rejoined and was issued a new number
    MemberRejoinedWithNewNumber {
        old_member_number: MemberNumber,
        new_member_number: MemberNumber,
        recorded_by: Actor,
        recorded_at: DateTime<Utc>,
    },

    /// A former member rejoined under their old number
    MemberRejoinedWithExistingNumber {
        member_number: MemberNumber,
        recorded_by: Actor,
        recorded_at: DateTime<Utc>,
    },
}

impl DomainEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::AreaCreated { .. } => "AreaCreated",
            DomainEvent::AreaRemoved { .. } => "AreaRemoved",
            DomainEvent::OwnerAdded { .. } => "OwnerAdded",
            DomainEvent::OwnerRemoved { .. } => "OwnerRemoved",
            DomainEvent::EquipmentAdded { .. } => "EquipmentAdded",
            DomainEvent::EquipmentTrainingSheetRegistered { .. } => {
                "EquipmentTrainingSheetRegistered"
            }
            DomainEvent::TrainerAdded { .. } => "TrainerAdded",
            DomainEvent::MemberTrainedOnEquipment { .. } => "MemberTrainedOnEquipment",
            DomainEvent::RevokeTrainedOnEquipment { .. } => "RevokeTrainedOnEquipment",
            DomainEvent::MemberNumberLinkedToEmail { .. } => "MemberNumberLinkedToEmail",
            DomainEvent::MemberDetailsUpdated { .. } => "MemberDetailsUpdated",
            DomainEvent::MemberEmailChanged { .. } => "MemberEmailChanged",
            DomainEvent::SuperUserDeclared { .. } => "SuperUserDeclared",
            DomainEvent::SuperUserRevoked { .. } => "SuperUserRevoked",
            DomainEvent::MemberRejoinedWithNewNumber { .. } => "MemberRejoinedWithNewNumber",
            DomainEvent::MemberRejoinedWithExistingNumber { .. } => {
                "MemberRejoinedWithExistingNumber"
            }
        }
    }

    /// Who recorded this event
    pub fn recorded_by(&self) -> &Actor {
        match self {
            DomainEvent::AreaCreated { recorded_by, .. }
            | DomainEvent::AreaRemoved { recorded_by, .. }
            | DomainEvent::OwnerAdded { recorded_by, .. }
            | DomainEvent::OwnerRemoved { recorded_by, .. }
            | DomainEvent::EquipmentAdded { recorded_by, .. }
            | DomainEvent::EquipmentTrainingSheetRegistered { recorded_by, .. }
            | DomainEvent::TrainerAdded { recorded_by, .. }
            | DomainEvent::MemberTrainedOnEquipment { recorded_by, .. }
            | DomainEvent::RevokeTrainedOnEquipment { recorded_by, .. }
            | DomainEvent::MemberNumberLinkedToEmail { recorded_by, .. }
            | DomainEvent::MemberDetailsUpdated { recorded_by, .. }
            | DomainEvent::MemberEmailChanged { recorded_by, .. }
            | DomainEvent::SuperUserDeclared { recorded_by, .. }
            | DomainEvent::SuperUserRevoked { recorded_by, .. }
            | DomainEvent::MemberRejoinedWithNewNumber { recorded_by, .. }
            | DomainEvent::MemberRejoinedWithExistingNumber { recorded_by, .. } => recorded_by,
        }
    }

    /// When this event was recorded
    pub fn recorded_at(&self) -> DateTime<Utc> {
        match self {
            DomainEvent::AreaCreated { recorded_at, .. }
            | DomainEvent::AreaRemoved { recorded_at, .. }
            | DomainEvent::OwnerAdded { recorded_at, .. }
            | DomainEvent::OwnerRemoved { recorded_at, .. }
            | DomainEvent::EquipmentAdded { recorded_at, .. }
            | DomainEvent::EquipmentTrainingSheetRegistered { recorded_at, .. }
            | DomainEvent::TrainerAdded { recorded_at, .. }
            | DomainEvent::MemberTrainedOnEquipment { recorded_at, .. }
            | DomainEvent::RevokeTrainedOnEquipment { recorded_at, .. }
            | DomainEvent::MemberNumberLinkedToEmail { recorded_at, .. }
            | DomainEvent::MemberDetailsUpdated { recorded_at, .. }
            | DomainEvent::MemberEmailChanged { recorded_at, .. }
            | DomainEvent::SuperUserDeclared { recorded_at, .. }
            | DomainEvent::SuperUserRevoked { recorded_at, .. }
            | DomainEvent::MemberRejoinedWithNewNumber { recorded_at, .. }
            | DomainEvent::MemberRejoinedWithExistingNumber { recorded_at, .. } => *recorded_at,
        }
    }

    /// The resource whose version stream this event belongs to
    pub fn resource(&self) -> Resource {
        match self {
            DomainEvent::AreaCreated { id, .. } | DomainEvent::AreaRemoved { id, .. } => {
                Resource::area(*id)
            }
            DomainEvent::OwnerAdded { area_id, .. } | DomainEvent::OwnerRemoved { area_id, .. } => {
                Resource::area(*area_id)
            }
            DomainEvent::EquipmentAdded { id, .. } => Resource::equipment(*id),
            DomainEvent::EquipmentTrainingSheetRegistered { equipment_id, .. }
            | DomainEvent::TrainerAdded { equipment_id, .. }
            | DomainEvent::MemberTrainedOnEquipment { equipment_id, .. }
            | DomainEvent::RevokeTrainedOnEquipment { equipment_id, .. } => {
                Resource::equipment(*equipment_id)
            }
            DomainEvent::MemberNumberLinkedToEmail { member_number, .. }
            | DomainEvent::MemberDetailsUpdated { member_number, .. }
            | DomainEvent::MemberEmailChanged { member_number, .. } => {
                Resource::member(*member_number)
            }
            // Privilege changes share a stream with rejoins, which revoke them
            DomainEvent::SuperUserDeclared { .. }
            | DomainEvent::SuperUserRevoked { .. }
            | DomainEvent::MemberRejoinedWithNewNumber { .. }
            | DomainEvent::MemberRejoinedWithExistingNumber { .. } => Resource::global(),
        }
    }

    // =========================================================================
    // Codec
    // =========================================================================

    /// Split the event into its type tag and the remaining fields
    pub fn encode(&self) -> Result<EncodedEvent, serde_json::Error> {
        let payload = match serde_json::to_value(self)? {
            Value::Object(mut fields) => {
                fields.remove("type");
                Value::Object(fields)
            }
            other => other,
        };

        Ok(EncodedEvent {
            event_type: self.event_type().to_string(),
            payload,
        })
    }

    /// Rebuild an event from a stored type tag and payload
    pub fn decode(event_type: &str, payload: &Value) -> Result<Self, DecodeError> {
        let Value::Object(fields) = payload else {
            return Err(DecodeError::NotAnObject {
                event_type: event_type.to_string(),
            });
        };

        if fields.contains_key("type") {
            return Err(DecodeError::ReservedField {
                event_type: event_type.to_string(),
            });
        }

        let mut tagged = fields.clone();
        tagged.insert("type".to_string(), Value::String(event_type.to_string()));

        serde_json::from_value(Value::Object(tagged)).map_err(|source| DecodeError::Schema {
            event_type: event_type.to_string(),
            source,
        })
    }

    /// Validate a raw `{type, ...fields}` value against the known variants
    pub fn parse(raw: Value) -> Result<Self, DecodeError> {
        let event_type = raw
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("<missing>")
            .to_string();

        serde_json::from_value(raw).map_err(|source| DecodeError::Schema { event_type, source })
    }
}

/// An event split into the columns it is stored under
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedEvent {
    pub event_type: String,
    pub payload: Value,
}

/// Stored data that does not match any known event shape
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("payload for {event_type} is not a JSON object")]
    NotAnObject { event_type: String },

    #[error("payload for {event_type} contains a reserved `type` field")]
    ReservedField { event_type: String },

    #[error("invalid {event_type} event: {source}")]
    Schema {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 18, 30, 0).unwrap()
    }

    fn all_variants() -> Vec<DomainEvent> {
        let area = Uuid::new_v4();
        let equipment = Uuid::new_v4();
        let by = Actor::System;
        let user = Actor::User {
            member_number: 1234,
            email: "sam@example.com".to_string(),
        };
        vec![
            DomainEvent::AreaCreated { id: area, name: "Laser Cutting".into(), recorded_by: by.clone(), recorded_at: at() },
            DomainEvent::AreaRemoved { id: area, recorded_by: by.clone(), recorded_at: at() },
            DomainEvent::OwnerAdded { area_id: area, member_number: 7, recorded_by: by.clone(), recorded_at: at() },
            DomainEvent::OwnerRemoved { area_id: area, member_number: 7, recorded_by: by.clone(), recorded_at: at() },
            DomainEvent::EquipmentAdded { id: equipment, name: "Epilog".into(), area_id: area, recorded_by: by.clone(), recorded_at: at() },
            DomainEvent::EquipmentTrainingSheetRegistered { equipment_id: equipment, training_sheet_id: "sheet-1".into(), recorded_by: by.clone(), recorded_at: at() },
            DomainEvent::TrainerAdded { equipment_id: equipment, member_number: 7, recorded_by: by.clone(), recorded_at: at() },
            DomainEvent::MemberTrainedOnEquipment { equipment_id: equipment, member_number: 8, trained_by: Some(7), recorded_by: user.clone(), recorded_at: at() },
            DomainEvent::MemberTrainedOnEquipment { equipment_id: equipment, member_number: 9, trained_by: None, recorded_by: by.clone(), recorded_at: at() },
            DomainEvent::RevokeTrainedOnEquipment { equipment_id: equipment, member_number: 8, recorded_by: by.clone(), recorded_at: at() },
            DomainEvent::MemberNumberLinkedToEmail { member_number: 8, email: "a@b.c".into(), name: Some("Ada".into()), form_of_address: None, recorded_by: by.clone(), recorded_at: at() },
            DomainEvent::MemberDetailsUpdated { member_number: 8, name: None, pronouns: Some("she/her".into()), recorded_by: user.clone(), recorded_at: at() },
            DomainEvent::MemberEmailChanged { member_number: 8, new_email: "new@b.c".into(), recorded_by: by.clone(), recorded_at: at() },
            DomainEvent::SuperUserDeclared { member_number: 8, recorded_by: Actor::Token { token: "admin".into() }, recorded_at: at() },
            DomainEvent::SuperUserRevoked { member_number: 8, recorded_by: by.clone(), recorded_at: at() },
            DomainEvent::MemberRejoinedWithNewNumber { old_member_number: 8, new_member_number: 80, recorded_by: by.clone(), recorded_at: at() },
            DomainEvent::MemberRejoinedWithExistingNumber { member_number: 8, recorded_by: by, recorded_at: at() },
        ]
    }

    #[test]
    fn test_every_variant_survives_encode_decode() {
        for event in all_variants() {
            let encoded = event.encode().unwrap();
            assert_eq!(encoded.event_type, event.event_type());
            assert!(encoded.payload.get("type").is_none());

            let decoded = DomainEvent::decode(&encoded.event_type, &encoded.payload).unwrap();
            assert_eq!(decoded, event);
        }
    }

    #[test]
    fn test_sub_second_timestamps_are_preserved() {
        let recorded_at = at() + chrono::Duration::microseconds(123_456);
        let event = DomainEvent::SuperUserDeclared {
            member_number: 1,
            recorded_by: Actor::System,
            recorded_at,
        };
        let encoded = event.encode().unwrap();
        let decoded = DomainEvent::decode(&encoded.event_type, &encoded.payload).unwrap();
        assert_eq!(decoded.recorded_at(), recorded_at);
    }

    #[test]
    fn test_extra_fields_are_rejected() {
        let payload = json!({
            "member_number": 12,
            "recorded_by": { "tag": "system" },
            "recorded_at": "2024-03-09T18:30:00Z",
            "colour": "blue"
        });
        let err = DomainEvent::decode("SuperUserDeclared", &payload).unwrap_err();
        assert!(matches!(err, DecodeError::Schema { .. }));
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        let payload = json!({ "recorded_by": { "tag": "system" }, "recorded_at": "2024-03-09T18:30:00Z" });
        assert!(DomainEvent::decode("SuperUserDeclared", &payload).is_err());
    }

    #[test]
    fn test_unknown_event_type_is_rejected() {
        let payload = json!({ "recorded_by": { "tag": "system" }, "recorded_at": "2024-03-09T18:30:00Z" });
        let err = DomainEvent::decode("MemberTeleported", &payload).unwrap_err();
        assert!(err.to_string().contains("MemberTeleported"));
    }

    #[test]
    fn test_non_object_payload_is_rejected() {
        let err = DomainEvent::decode("AreaCreated", &json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, DecodeError::NotAnObject { .. }));
    }

    #[test]
    fn test_payload_may_not_smuggle_a_type_field() {
        let payload = json!({ "type": "AreaRemoved", "id": Uuid::nil() });
        let err = DomainEvent::decode("AreaCreated", &payload).unwrap_err();
        assert!(matches!(err, DecodeError::ReservedField { .. }));
    }

    #[test]
    fn test_parse_tagged_value() {
        let raw = json!({
            "type": "OwnerAdded",
            "area_id": Uuid::nil(),
            "member_number": 3,
            "recorded_by": { "tag": "token", "token": "admin" },
            "recorded_at": "2024-03-09T18:30:00Z"
        });
        let event = DomainEvent::parse(raw).unwrap();
        assert_eq!(event.event_type(), "OwnerAdded");
        assert_eq!(event.resource(), Resource::area(Uuid::nil()));
    }

    #[test]
    fn test_rejoin_and_privilege_events_share_the_global_resource() {
        let rejoin = DomainEvent::MemberRejoinedWithExistingNumber {
            member_number: 5,
            recorded_by: Actor::System,
            recorded_at: at(),
        };
        let declared = DomainEvent::SuperUserDeclared {
            member_number: 5,
            recorded_by: Actor::System,
            recorded_at: at(),
        };
        assert_eq!(rejoin.resource(), Resource::global());
        assert_eq!(declared.resource(), Resource::global());
    }
}
