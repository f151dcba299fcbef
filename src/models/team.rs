//! Team members and per-event assignments.

use super::require_text;
use crate::Result;
use crate::storage::{FromRecord, Record};
use serde::{Deserialize, Serialize};

/// A crew member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    /// Primary key.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Default role (camera, editor, producer...).
    pub role: String,
    /// Department.
    pub department: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Inactive members are kept for history but hidden from pickers.
    pub active: bool,
}

impl FromRecord for TeamMember {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: record.text("id")?,
            name: record.text("name")?,
            role: record.opt_text("role")?.unwrap_or_default(),
            department: record.opt_text("department")?,
            email: record.opt_text("email")?,
            active: record.boolean("active")?,
        })
    }
}

/// Fields for a new team member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeamMember {
    /// Full name (required).
    pub name: String,
    /// Default role.
    pub role: String,
    /// Department.
    pub department: Option<String>,
    /// Contact email.
    pub email: Option<String>,
}

impl NewTeamMember {
    /// Starts a request for `name` in `role`.
    #[must_use]
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            ..Self::default()
        }
    }

    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] when the name is blank.
    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name)
    }
}

/// A member assigned to an event, with the role they play on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTeamMember {
    /// Event.
    pub event_id: String,
    /// Member.
    pub member_id: String,
    /// Member name, joined from `team_members`.
    pub name: String,
    /// Role on this event.
    pub role: String,
}

impl FromRecord for EventTeamMember {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            event_id: record.text("event_id")?,
            member_id: record.text("member_id")?,
            name: record.opt_text("name")?.unwrap_or_default(),
            role: record.opt_text("role")?.unwrap_or_default(),
        })
    }
}
