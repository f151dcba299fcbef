//! Creative briefings attached to events.

use super::require_text;
use crate::Result;
use crate::storage::{FromRecord, Record};
use serde::{Deserialize, Serialize};

/// A briefing document for an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Briefing {
    /// Primary key.
    pub id: String,
    /// Owning event.
    pub event_id: String,
    /// Project title.
    pub project_name: String,
    /// Promised delivery date.
    pub delivery_date: Option<String>,
    /// Free-form body.
    pub content: String,
    /// Responsible lead.
    pub team_lead: Option<String>,
    /// ISO-8601 creation time.
    pub created_at: String,
}

impl FromRecord for Briefing {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: record.text("id")?,
            event_id: record.text("event_id")?,
            project_name: record.text("project_name")?,
            delivery_date: record.opt_text("delivery_date")?,
            content: record.opt_text("content")?.unwrap_or_default(),
            team_lead: record.opt_text("team_lead")?,
            created_at: record.opt_text("created_at")?.unwrap_or_default(),
        })
    }
}

/// Fields for a new briefing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBriefing {
    /// Owning event (required).
    pub event_id: String,
    /// Project title (required).
    pub project_name: String,
    /// Promised delivery date.
    pub delivery_date: Option<String>,
    /// Free-form body.
    pub content: String,
    /// Responsible lead.
    pub team_lead: Option<String>,
}

impl NewBriefing {
    /// Starts a briefing for `event_id`.
    #[must_use]
    pub fn new(event_id: impl Into<String>, project_name: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            project_name: project_name.into(),
            ..Self::default()
        }
    }

    /// Sets the body.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] when the event or title is blank.
    pub fn validate(&self) -> Result<()> {
        require_text("event_id", &self.event_id)?;
        require_text("project_name", &self.project_name)
    }
}
