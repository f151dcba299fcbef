//! Entity models.
//!
//! Plain structs mapped from database rows through
//! [`FromRecord`](crate::storage::FromRecord), plus the `New*` requests the
//! services accept when creating rows.

mod briefing;
mod client;
mod comment;
mod deliverable;
mod event;
mod status;
mod team;
mod timeline;
mod user;

pub use briefing::{Briefing, NewBriefing};
pub use client::{Client, NewClient};
pub use comment::{Comment, NewComment};
pub use deliverable::{
    Deliverable, NewDeliverable, PROGRESS_COMPLETE, status_for_progress, validate_progress,
};
pub use event::{Event, NewEvent};
pub use status::{AccessLevel, DeliverableStatus, EventStatus, ItemStatus, Priority};
pub use team::{EventTeamMember, NewTeamMember, TeamMember};
pub use timeline::{NewTimelineItem, TimelineItem};
pub use user::{NewUser, User};

use crate::storage::Record;
use crate::{Error, Result};

/// Generates a new primary key (UUID v4).
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Current local time as ISO-8601 text with second precision.
#[must_use]
pub fn now_iso() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Splits a delimited list column. Commas and semicolons both separate
/// entries; blanks are dropped.
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Joins list entries for storage, dropping blanks.
#[must_use]
pub fn join_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Reads an enum column. `NULL` or empty text yields the default; text the
/// parser rejects is an [`Error::InvalidRecord`].
pub(crate) fn enum_column<T: Default>(
    record: &Record,
    column: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<T> {
    match record.opt_text(column)? {
        None => Ok(T::default()),
        Some(raw) => parse(&raw).ok_or_else(|| Error::InvalidRecord {
            column: column.to_string(),
            cause: format!("unrecognised value '{raw}'"),
        }),
    }
}

/// Rejects blank required text.
pub(crate) fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}
