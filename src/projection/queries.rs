//! Read-model queries
//!
//! Accessors over the folded tables. Member lookups resolve through
//! [`MemberLinking`](super::MemberLinking): every row in the person's group is
//! merged into one view.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::MemberNumber;

use super::read_model::{MemberRow, ReadModel};

/// A person, merged across every member number they have held
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Highest number in the group, i.e. the current identity
    pub member_number: MemberNumber,
    /// Other numbers in the group, highest first
    pub other_member_numbers: Vec<MemberNumber>,
    pub email: String,
    pub previous_emails: Vec<String>,
    pub name: Option<String>,
    pub form_of_address: Option<String>,
    pub pronouns: Option<String>,
    pub gravatar_hash: String,
    pub is_super_user: bool,
    pub super_user_since: Option<DateTime<Utc>>,
    pub joined: DateTime<Utc>,
    pub trained_on: Vec<TrainedOn>,
    pub trainer_for: Vec<Uuid>,
    pub owner_of: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainedOn {
    pub equipment_id: Uuid,
    pub equipment_name: Option<String>,
    pub trained_since: DateTime<Utc>,
    pub trained_by: Option<MemberNumber>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    pub id: Uuid,
    pub name: String,
    pub owners: Vec<MemberNumber>,
    pub equipment: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equipment {
    pub id: Uuid,
    pub name: String,
    pub area_id: Uuid,
    pub area_name: Option<String>,
    pub training_sheet_id: Option<String>,
    pub trainers: Vec<MemberNumber>,
    pub trained_members: Vec<MemberNumber>,
}

impl ReadModel {
    pub fn members(&self) -> Members<'_> {
        Members { model: self }
    }

    pub fn areas(&self) -> Areas<'_> {
        Areas { model: self }
    }

    pub fn equipment(&self) -> EquipmentQueries<'_> {
        EquipmentQueries { model: self }
    }
}

// =========================================================================
// Members
// =========================================================================

pub struct Members<'a> {
    model: &'a ReadModel,
}

impl Members<'_> {
    /// Look up a person by any of their member numbers
    pub fn get(&self, member_number: MemberNumber) -> Option<Member> {
        let group = self.model.linking.group_of(member_number);
        self.merge(&group)
    }

    /// One entry per person, ordered by current member number
    pub fn get_all(&self) -> Vec<Member> {
        let mut seen = BTreeSet::new();
        let mut members = Vec::new();

        for &number in self.model.members.keys() {
            if seen.contains(&number) {
                continue;
            }
            let group = self.model.linking.group_of(number);
            seen.extend(group.iter().copied());
            if let Some(member) = self.merge(&group) {
                members.push(member);
            }
        }

        members.sort_by_key(|member| member.member_number);
        members
    }

    pub fn count(&self) -> usize {
        self.get_all().len()
    }

    /// Merge every row of a group.
    ///
    /// Rows are ranked by member number, highest first. Scalars come from the
    /// top-ranked row; optional scalars fall back down the ranking; lists are
    /// unioned.
    fn merge(&self, group: &BTreeSet<MemberNumber>) -> Option<Member> {
        let rows: Vec<&MemberRow> = group
            .iter()
            .rev()
            .filter_map(|number| self.model.members.get(number))
            .collect();
        let primary = *rows.first()?;

        let first_some = |pick: fn(&MemberRow) -> &Option<String>| {
            rows.iter().find_map(|row| pick(row).clone())
        };

        let mut previous_emails: Vec<String> = Vec::new();
        for row in rows.iter().rev() {
            let candidates = row.previous_emails.iter().chain(
                (row.member_number != primary.member_number).then_some(&row.email),
            );
            for email in candidates {
                if *email != primary.email && !previous_emails.contains(email) {
                    previous_emails.push(email.clone());
                }
            }
        }

        Some(Member {
            member_number: primary.member_number,
            other_member_numbers: group
                .iter()
                .rev()
                .copied()
                .filter(|number| *number != primary.member_number)
                .collect(),
            email: primary.email.clone(),
            previous_emails,
            name: first_some(|row| &row.name),
            form_of_address: first_some(|row| &row.form_of_address),
            pronouns: first_some(|row| &row.pronouns),
            gravatar_hash: primary.gravatar_hash.clone(),
            is_super_user: primary.is_super_user,
            super_user_since: primary.super_user_since,
            joined: rows.iter().map(|row| row.joined).min().unwrap_or(primary.joined),
            trained_on: self.trained_on(group),
            trainer_for: self.trainer_for(group),
            owner_of: self.owner_of(group),
        })
    }

    /// Earliest training per equipment across the group
    fn trained_on(&self, group: &BTreeSet<MemberNumber>) -> Vec<TrainedOn> {
        let mut by_equipment: BTreeMap<Uuid, TrainedOn> = BTreeMap::new();

        for row in self
            .model
            .trained
            .values()
            .filter(|row| group.contains(&row.member_number))
        {
            let candidate = TrainedOn {
                equipment_id: row.equipment_id,
                equipment_name: self
                    .model
                    .equipment
                    .get(&row.equipment_id)
                    .map(|equipment| equipment.name.clone()),
                trained_since: row.trained_since,
                trained_by: row.trained_by,
            };
            by_equipment
                .entry(row.equipment_id)
                .and_modify(|existing| {
                    if candidate.trained_since < existing.trained_since {
                        *existing = candidate.clone();
                    }
                })
                .or_insert(candidate);
        }

        by_equipment.into_values().collect()
    }

    fn trainer_for(&self, group: &BTreeSet<MemberNumber>) -> Vec<Uuid> {
        let ids: BTreeSet<Uuid> = self
            .model
            .trainers
            .keys()
            .filter(|(_, number)| group.contains(number))
            .map(|(equipment_id, _)| *equipment_id)
            .collect();
        ids.into_iter().collect()
    }

    fn owner_of(&self, group: &BTreeSet<MemberNumber>) -> Vec<Uuid> {
        let ids: BTreeSet<Uuid> = self
            .model
            .owners
            .keys()
            .filter(|(_, number)| group.contains(number))
            .map(|(area_id, _)| *area_id)
            .collect();
        ids.into_iter().collect()
    }
}

// =========================================================================
// Areas
// =========================================================================

pub struct Areas<'a> {
    model: &'a ReadModel,
}

impl Areas<'_> {
    pub fn get(&self, id: Uuid) -> Option<Area> {
        let row = self.model.areas.get(&id)?;

        Some(Area {
            id: row.id,
            name: row.name.clone(),
            owners: self
                .model
                .owners
                .keys()
                .filter(|(area_id, _)| *area_id == id)
                .map(|(_, number)| *number)
                .collect(),
            equipment: self
                .model
                .equipment
                .values()
                .filter(|equipment| equipment.area_id == id)
                .map(|equipment| equipment.id)
                .collect(),
        })
    }

    pub fn get_all(&self) -> Vec<Area> {
        self.model
            .areas
            .keys()
            .filter_map(|id| self.get(*id))
            .collect()
    }
}

// =========================================================================
// Equipment
// =========================================================================

pub struct EquipmentQueries<'a> {
    model: &'a ReadModel,
}

impl EquipmentQueries<'_> {
    pub fn get(&self, id: Uuid) -> Option<Equipment> {
        let row = self.model.equipment.get(&id)?;

        Some(Equipment {
            id: row.id,
            name: row.name.clone(),
            area_id: row.area_id,
            area_name: self.model.areas.get(&row.area_id).map(|area| area.name.clone()),
            training_sheet_id: row.training_sheet_id.clone(),
            trainers: self
                .model
                .trainers
                .keys()
                .filter(|(equipment_id, _)| *equipment_id == id)
                .map(|(_, number)| *number)
                .collect(),
            trained_members: self
                .model
                .trained
                .values()
                .filter(|trained| trained.equipment_id == id)
                .map(|trained| trained.member_number)
                .collect(),
        })
    }

    pub fn get_all(&self) -> Vec<Equipment> {
        self.model
            .equipment
            .keys()
            .filter_map(|id| self.get(*id))
            .collect()
    }
}
