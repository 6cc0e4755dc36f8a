//! Resources and versions
//!
//! A resource is the aggregate boundary whose events are versioned together
//! for optimistic concurrency control.

use std::fmt;

use uuid::Uuid;

use super::MemberNumber;

/// Kind of aggregate an event stream belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceType {
    Area,
    Equipment,
    Member,
    Global,
}

impl ResourceType {
    /// Name stored in the `resource_type` column
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Area => "Area",
            ResourceType::Equipment => "Equipment",
            ResourceType::Member => "Member",
            ResourceType::Global => "Global",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one versioned event stream
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Resource {
    pub id: String,
    pub resource_type: ResourceType,
}

impl Resource {
    pub fn new(id: impl Into<String>, resource_type: ResourceType) -> Self {
        Self {
            id: id.into(),
            resource_type,
        }
    }

    pub fn area(id: Uuid) -> Self {
        Self::new(id.to_string(), ResourceType::Area)
    }

    pub fn equipment(id: Uuid) -> Self {
        Self::new(id.to_string(), ResourceType::Equipment)
    }

    pub fn member(member_number: MemberNumber) -> Self {
        Self::new(member_number.to_string(), ResourceType::Member)
    }

    /// The singleton used for facts that span several members
    pub fn global() -> Self {
        Self::new("global", ResourceType::Global)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_type, self.id)
    }
}

/// Highest committed version of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceVersion {
    /// No event has ever been committed for the resource
    NoSuchResource,
    Version(i64),
}

impl ResourceVersion {
    /// Build from `MAX(resource_version)`, which is NULL for an empty stream
    pub fn from_max(max: Option<i64>) -> Self {
        match max {
            Some(version) => ResourceVersion::Version(version),
            None => ResourceVersion::NoSuchResource,
        }
    }

    /// Version slot the next commit will try to occupy
    pub fn next(self) -> i64 {
        match self {
            ResourceVersion::NoSuchResource => 0,
            ResourceVersion::Version(version) => version + 1,
        }
    }

    pub fn exists(self) -> bool {
        matches!(self, ResourceVersion::Version(_))
    }
}

impl fmt::Display for ResourceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceVersion::NoSuchResource => f.write_str("none"),
            ResourceVersion::Version(version) => write!(f, "{}", version),
        }
    }
}
