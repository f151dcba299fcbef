//! Comments on arbitrary items.

use super::require_text;
use crate::Result;
use crate::storage::{FromRecord, Record};
use serde::{Deserialize, Serialize};

/// A comment attached to any item by `(item_type, item_id)`.
///
/// There is no foreign key: deleting the parent leaves its comments behind
/// until [`crate::services::CommentService::delete_for_item`] is called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Primary key.
    pub id: String,
    /// Commented item.
    pub item_id: String,
    /// Kind of item (`event`, `deliverable`, `timeline_item`...).
    pub item_type: String,
    /// Author display name.
    pub author: String,
    /// Body.
    pub text: String,
    /// ISO-8601 creation time.
    pub created_at: String,
}

impl FromRecord for Comment {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: record.text("id")?,
            item_id: record.text("item_id")?,
            item_type: record.text("item_type")?,
            author: record.opt_text("author")?.unwrap_or_default(),
            text: record.opt_text("text")?.unwrap_or_default(),
            created_at: record.opt_text("created_at")?.unwrap_or_default(),
        })
    }
}

/// Fields for a new comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    /// Commented item.
    pub item_id: String,
    /// Kind of item.
    pub item_type: String,
    /// Author display name.
    pub author: String,
    /// Body.
    pub text: String,
}

impl NewComment {
    /// Creates a comment request.
    #[must_use]
    pub fn new(
        item_type: impl Into<String>,
        item_id: impl Into<String>,
        author: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            item_type: item_type.into(),
            author: author.into(),
            text: text.into(),
        }
    }

    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] for a blank field.
    pub fn validate(&self) -> Result<()> {
        require_text("item_id", &self.item_id)?;
        require_text("item_type", &self.item_type)?;
        require_text("author", &self.author)?;
        require_text("text", &self.text)
    }
}
