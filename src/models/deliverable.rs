//! Contracted deliverables.

use super::{DeliverableStatus, enum_column, require_text};
use crate::storage::{FromRecord, Record};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Highest progress value; reaching it completes the deliverable.
pub const PROGRESS_COMPLETE: u8 = 100;

/// A contracted output of an event (edited video, photo set...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deliverable {
    /// Primary key.
    pub id: String,
    /// Owning event.
    pub event_id: String,
    /// Client receiving the deliverable.
    pub client_id: Option<String>,
    /// Title.
    pub title: String,
    /// ISO-8601 deadline.
    pub deadline: Option<String>,
    /// Workflow status.
    pub status: DeliverableStatus,
    /// Completion percentage, 0..=100.
    pub progress: u8,
}

impl FromRecord for Deliverable {
    fn from_record(record: &Record) -> Result<Self> {
        let progress = record.opt_integer("progress")?.unwrap_or(0);
        Ok(Self {
            id: record.text("id")?,
            event_id: record.text("event_id")?,
            client_id: record.opt_text("client_id")?,
            title: record.text("title")?,
            deadline: record.opt_text("deadline")?,
            status: enum_column(record, "status", DeliverableStatus::parse)?,
            progress: u8::try_from(progress.clamp(0, i64::from(PROGRESS_COMPLETE))).unwrap_or(0),
        })
    }
}

/// Validates a progress percentage.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] outside `0..=100`.
pub fn validate_progress(progress: i64) -> Result<u8> {
    u8::try_from(progress)
        .ok()
        .filter(|p| *p <= PROGRESS_COMPLETE)
        .ok_or_else(|| Error::InvalidInput(format!("progress must be within 0..=100, got {progress}")))
}

/// Status to store for a progress value: full progress completes the
/// deliverable, anything else keeps `status`.
#[must_use]
pub const fn status_for_progress(progress: u8, status: DeliverableStatus) -> DeliverableStatus {
    if progress >= PROGRESS_COMPLETE {
        DeliverableStatus::Completed
    } else {
        status
    }
}

/// Fields for a new deliverable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDeliverable {
    /// Owning event (required).
    pub event_id: String,
    /// Client receiving the deliverable.
    pub client_id: Option<String>,
    /// Title (required).
    pub title: String,
    /// ISO-8601 deadline.
    pub deadline: Option<String>,
    /// Initial status.
    pub status: DeliverableStatus,
    /// Initial progress, 0..=100.
    pub progress: i64,
}

impl NewDeliverable {
    /// Starts a deliverable for `event_id`.
    #[must_use]
    pub fn new(event_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the receiving client.
    #[must_use]
    pub fn for_client(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub fn due(mut self, deadline: impl Into<String>) -> Self {
        self.deadline = Some(deadline.into());
        self
    }

    /// Sets the initial progress.
    #[must_use]
    pub const fn with_progress(mut self, progress: i64) -> Self {
        self.progress = progress;
        self
    }

    /// Checks required fields and the progress range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for blank fields or out-of-range progress.
    pub fn validate(&self) -> Result<u8> {
        require_text("event_id", &self.event_id)?;
        require_text("title", &self.title)?;
        validate_progress(self.progress)
    }
}
