//! Production events.

use super::{EventStatus, enum_column, require_text, split_list};
use crate::format::parse_iso;
use crate::storage::{FromRecord, Record};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// An audiovisual production event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Primary key.
    pub id: String,
    /// Event name.
    pub name: String,
    /// ISO-8601 date or date-time.
    pub date: String,
    /// Venue.
    pub location: Option<String>,
    /// Owning client, if any.
    pub client_id: Option<String>,
    /// Workflow status.
    pub status: EventStatus,
    /// Free-text tags.
    pub tags: Vec<String>,
    /// Notes.
    pub description: Option<String>,
    /// ISO-8601 creation time.
    pub created_at: String,
}

impl FromRecord for Event {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: record.text("id")?,
            name: record.text("name")?,
            date: record.opt_text("date")?.unwrap_or_default(),
            location: record.opt_text("location")?,
            client_id: record.opt_text("client_id")?,
            status: enum_column(record, "status", EventStatus::parse)?,
            tags: split_list(&record.opt_text("tags")?.unwrap_or_default()),
            description: record.opt_text("description")?,
            created_at: record.opt_text("created_at")?.unwrap_or_default(),
        })
    }
}

/// Fields for a new event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    /// Event name (required).
    pub name: String,
    /// ISO-8601 date or date-time (required).
    pub date: String,
    /// Venue.
    pub location: Option<String>,
    /// Owning client; must exist when given.
    pub client_id: Option<String>,
    /// Initial status.
    pub status: EventStatus,
    /// Free-text tags.
    pub tags: Vec<String>,
    /// Notes.
    pub description: Option<String>,
}

impl NewEvent {
    /// Starts a request for an event called `name` on `date`.
    #[must_use]
    pub fn new(name: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            date: date.into(),
            ..Self::default()
        }
    }

    /// Sets the owning client.
    #[must_use]
    pub fn for_client(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Sets the venue.
    #[must_use]
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Checks required fields and the date format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a blank name or an unparseable date.
    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        if parse_iso(&self.date).is_none() {
            return Err(Error::InvalidInput(format!("invalid event date '{}'", self.date)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqlValue;

    #[test]
    fn test_from_record_splits_tags() {
        let record = Record::from_pairs([
            ("id", SqlValue::from("e1")),
            ("name", SqlValue::from("Launch")),
            ("date", SqlValue::from("2025-06-01")),
            ("status", SqlValue::from("confirmed")),
            ("tags", SqlValue::from("live, 4k")),
            ("client_id", SqlValue::Null),
        ]);
        let event = Event::from_record(&record).unwrap();
        assert_eq!(event.status, EventStatus::Confirmed);
        assert_eq!(event.tags, ["live", "4k"]);
        assert_eq!(event.client_id, None);
    }

    #[test]
    fn test_validate_date() {
        assert!(NewEvent::new("Launch", "2025-06-01T18:00").validate().is_ok());
        assert!(NewEvent::new("Launch", "June 1st").validate().is_err());
        assert!(NewEvent::new("", "2025-06-01").validate().is_err());
    }
}
