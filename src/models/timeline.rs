//! Timeline (schedule) items.

use super::{ItemStatus, Priority, enum_column, require_text, split_list};
use crate::format::parse_iso;
use crate::storage::{FromRecord, Record};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// One scheduled task of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineItem {
    /// Primary key.
    pub id: String,
    /// Owning event.
    pub event_id: String,
    /// Task title.
    pub title: String,
    /// ISO-8601 start.
    pub start_time: String,
    /// ISO-8601 end.
    pub end_time: String,
    /// Responsible team member.
    pub responsible_id: Option<String>,
    /// Stored status.
    pub status: ItemStatus,
    /// Priority.
    pub priority: Priority,
    /// Bar color override.
    pub color: Option<String>,
    /// Ids of items this one waits for.
    pub dependencies: Vec<String>,
}

impl FromRecord for TimelineItem {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: record.text("id")?,
            event_id: record.text("event_id")?,
            title: record.text("title")?,
            start_time: record.opt_text("start_time")?.unwrap_or_default(),
            end_time: record.opt_text("end_time")?.unwrap_or_default(),
            responsible_id: record.opt_text("responsible_id")?,
            status: enum_column(record, "status", ItemStatus::parse)?,
            priority: enum_column(record, "priority", Priority::parse)?,
            color: record.opt_text("color")?,
            dependencies: split_list(&record.opt_text("dependencies")?.unwrap_or_default()),
        })
    }
}

/// Fields for a new timeline item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTimelineItem {
    /// Owning event (required).
    pub event_id: String,
    /// Task title (required).
    pub title: String,
    /// ISO-8601 start (required).
    pub start_time: String,
    /// ISO-8601 end (required, not before the start).
    pub end_time: String,
    /// Responsible team member.
    pub responsible_id: Option<String>,
    /// Initial status.
    pub status: ItemStatus,
    /// Priority.
    pub priority: Priority,
    /// Bar color override.
    pub color: Option<String>,
    /// Ids of items this one waits for.
    pub dependencies: Vec<String>,
}

impl NewTimelineItem {
    /// Starts an item for `event_id` spanning `start..end`.
    #[must_use]
    pub fn new(
        event_id: impl Into<String>,
        title: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            title: title.into(),
            start_time: start_time.into(),
            end_time: end_time.into(),
            ..Self::default()
        }
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the dependencies.
    #[must_use]
    pub fn depends_on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Checks required fields and that the span is well ordered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for blank fields, unparseable times or
    /// an end before the start.
    pub fn validate(&self) -> Result<()> {
        require_text("event_id", &self.event_id)?;
        require_text("title", &self.title)?;
        let start = parse_iso(&self.start_time)
            .ok_or_else(|| Error::InvalidInput(format!("invalid start time '{}'", self.start_time)))?;
        let end = parse_iso(&self.end_time)
            .ok_or_else(|| Error::InvalidInput(format!("invalid end time '{}'", self.end_time)))?;
        if end < start {
            return Err(Error::InvalidInput("end time precedes start time".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_span() {
        let ok = NewTimelineItem::new("e1", "Setup", "2025-06-01T08:00", "2025-06-01T10:00");
        assert!(ok.validate().is_ok());

        let reversed = NewTimelineItem::new("e1", "Setup", "2025-06-01T10:00", "2025-06-01T08:00");
        assert!(matches!(reversed.validate(), Err(Error::InvalidInput(_))));

        let garbage = NewTimelineItem::new("e1", "Setup", "soon", "2025-06-01T08:00");
        assert!(garbage.validate().is_err());
    }
}
