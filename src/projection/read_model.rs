//! Read model
//!
//! Query-optimized tables folded from the event log. Nothing here is
//! authoritative: a fresh [`ReadModel`] fed the whole log reproduces the same
//! state, so it can be thrown away and rebuilt at any time.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::{gravatar_hash, DomainEvent, MemberNumber};

use super::MemberLinking;

/// Two trainings of the same member on the same equipment closer together
/// than this are one fact delivered twice. Older backends truncated stored
/// timestamps to whole seconds, which makes a re-delivery look up to a
/// second apart.
pub const TRAINING_REDELIVERY_WINDOW_MS: i64 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRow {
    pub member_number: MemberNumber,
    pub email: String,
    /// Earlier primary emails, oldest first
    pub previous_emails: Vec<String>,
    pub name: Option<String>,
    pub form_of_address: Option<String>,
    pub pronouns: Option<String>,
    pub gravatar_hash: String,
    pub is_super_user: bool,
    pub super_user_since: Option<DateTime<Utc>>,
    pub joined: DateTime<Utc>,
}

impl MemberRow {
    fn change_email(&mut self, new_email: &str) {
        if self.email == new_email {
            return;
        }
        let old = std::mem::replace(&mut self.email, new_email.to_string());
        self.previous_emails.push(old);
        self.gravatar_hash = gravatar_hash(new_email);
    }

    fn revoke_super_user(&mut self) {
        self.is_super_user = false;
        self.super_user_since = None;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaRow {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentRow {
    pub id: Uuid,
    pub name: String,
    pub area_id: Uuid,
    pub training_sheet_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainedRow {
    pub member_number: MemberNumber,
    pub equipment_id: Uuid,
    pub trained_since: DateTime<Utc>,
    pub trained_by: Option<MemberNumber>,
}

/// All derived tables plus the count of events folded into them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadModel {
    pub(crate) members: BTreeMap<MemberNumber, MemberRow>,
    pub(crate) areas: BTreeMap<Uuid, AreaRow>,
    /// (area, owner) -> owner since
    pub(crate) owners: BTreeMap<(Uuid, MemberNumber), DateTime<Utc>>,
    pub(crate) equipment: BTreeMap<Uuid, EquipmentRow>,
    /// (equipment, trainer) -> trainer since
    pub(crate) trainers: BTreeMap<(Uuid, MemberNumber), DateTime<Utc>>,
    pub(crate) trained: BTreeMap<(MemberNumber, Uuid), TrainedRow>,
    pub(crate) linking: MemberLinking,
    applied: usize,
}

impl ReadModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a whole batch of events, in order
    pub fn from_events<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a DomainEvent>,
    {
        let mut model = Self::new();
        model.apply_all(events);
        model
    }

    /// Number of events folded so far
    pub fn applied(&self) -> usize {
        self.applied
    }

    pub fn linking(&self) -> &MemberLinking {
        &self.linking
    }

    pub fn apply_all<'a, I>(&mut self, events: I)
    where
        I: IntoIterator<Item = &'a DomainEvent>,
    {
        for event in events {
            self.apply(event);
        }
    }

    /// Fold one event. Must be called exactly once per event, in log order.
    pub fn apply(&mut self, event: &DomainEvent) {
        match event {
            DomainEvent::AreaCreated {
                id,
                name,
                recorded_at,
                ..
            } => {
                self.areas.insert(
                    *id,
                    AreaRow {
                        id: *id,
                        name: name.clone(),
                        created_at: *recorded_at,
                    },
                );
            }

            DomainEvent::AreaRemoved { id, .. } => {
                self.areas.remove(id);
                self.owners.retain(|(area_id, _), _| area_id != id);

                let equipment = &self.equipment;
                self.trainers.retain(|(equipment_id, _), _| {
                    equipment
                        .get(equipment_id)
                        .map_or(true, |row| row.area_id != *id)
                });
            }

            DomainEvent::OwnerAdded {
                area_id,
                member_number,
                recorded_at,
                ..
            } => {
                self.owners
                    .entry((*area_id, *member_number))
                    .or_insert(*recorded_at);
            }

            DomainEvent::OwnerRemoved {
                area_id,
                member_number,
                ..
            } => {
                self.owners.remove(&(*area_id, *member_number));
            }

            DomainEvent::EquipmentAdded {
                id, name, area_id, ..
            } => {
                self.equipment.insert(
                    *id,
                    EquipmentRow {
                        id: *id,
                        name: name.clone(),
                        area_id: *area_id,
                        training_sheet_id: None,
                    },
                );
            }

            DomainEvent::EquipmentTrainingSheetRegistered {
                equipment_id,
                training_sheet_id,
                ..
            } => {
                if let Some(row) = self.equipment.get_mut(equipment_id) {
                    row.training_sheet_id = Some(training_sheet_id.clone());
                }
            }

            DomainEvent::TrainerAdded {
                equipment_id,
                member_number,
                recorded_at,
                ..
            } => {
                self.trainers
                    .entry((*equipment_id, *member_number))
                    .or_insert(*recorded_at);
            }

            DomainEvent::MemberTrainedOnEquipment {
                equipment_id,
                member_number,
                trained_by,
                recorded_at,
                ..
            } => {
                let key = (*member_number, *equipment_id);
                let window = Duration::milliseconds(TRAINING_REDELIVERY_WINDOW_MS);

                if let Some(existing) = self.trained.get(&key) {
                    if existing.trained_since > *recorded_at - window {
                        tracing::debug!(
                            member_number = member_number,
                            equipment_id = %equipment_id,
                            "Dropping re-delivered training"
                        );
                        self.applied += 1;
                        return;
                    }
                }

                self.trained.insert(
                    key,
                    TrainedRow {
                        member_number: *member_number,
                        equipment_id: *equipment_id,
                        trained_since: *recorded_at,
                        trained_by: *trained_by,
                    },
                );
            }

            DomainEvent::RevokeTrainedOnEquipment {
                equipment_id,
                member_number,
                ..
            } => {
                self.trained.remove(&(*member_number, *equipment_id));
            }

            DomainEvent::MemberNumberLinkedToEmail {
                member_number,
                email,
                name,
                form_of_address,
                recorded_at,
                ..
            } => match self.members.get_mut(member_number) {
                Some(row) => {
                    row.change_email(email);
                    if name.is_some() {
                        row.name = name.clone();
                    }
                    if form_of_address.is_some() {
                        row.form_of_address = form_of_address.clone();
                    }
                }
                None => {
                    self.members.insert(
                        *member_number,
                        MemberRow {
                            member_number: *member_number,
                            email: email.clone(),
                            previous_emails: Vec::new(),
                            name: name.clone(),
                            form_of_address: form_of_address.clone(),
                            pronouns: None,
                            gravatar_hash: gravatar_hash(email),
                            is_super_user: false,
                            super_user_since: None,
                            joined: *recorded_at,
                        },
                    );
                }
            },

            DomainEvent::MemberDetailsUpdated {
                member_number,
                name,
                pronouns,
                ..
            } => {
                if let Some(row) = self.members.get_mut(member_number) {
                    if name.is_some() {
                        row.name = name.clone();
                    }
                    if pronouns.is_some() {
                        row.pronouns = pronouns.clone();
                    }
                }
            }

            DomainEvent::MemberEmailChanged {
                member_number,
                new_email,
                ..
            } => {
                if let Some(row) = self.members.get_mut(member_number) {
                    row.change_email(new_email);
                }
            }

            DomainEvent::SuperUserDeclared {
                member_number,
                recorded_at,
                ..
            } => {
                if let Some(row) = self.members.get_mut(member_number) {
                    row.is_super_user = true;
                    row.super_user_since = Some(*recorded_at);
                }
            }

            DomainEvent::SuperUserRevoked { member_number, .. } => {
                if let Some(row) = self.members.get_mut(member_number) {
                    row.revoke_super_user();
                }
            }

            DomainEvent::MemberRejoinedWithNewNumber {
                old_member_number,
                new_member_number,
                ..
            } => {
                self.linking.link([*old_member_number, *new_member_number]);
                for number in [old_member_number, new_member_number] {
                    if let Some(row) = self.members.get_mut(number) {
                        row.revoke_super_user();
                    }
                }
            }

            DomainEvent::MemberRejoinedWithExistingNumber { member_number, .. } => {
                if let Some(row) = self.members.get_mut(member_number) {
                    row.revoke_super_user();
                }
            }
        }

        self.applied += 1;
    }
}
