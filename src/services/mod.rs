//! Business logic services.
//!
//! Each service wraps a shared [`Database`] and exposes typed operations for
//! one entity family. Referential rules that the UI relies on (no deleting a
//! client with events, no deleting an event with deliverables) are checked
//! here against uncached reads before the write is attempted.

mod auth;
mod briefings;
mod clients;
mod comments;
mod dashboard;
mod deliverables;
mod events;
mod team;
mod timeline;

pub use auth::{AuthService, hash_password, verify_password};
pub use briefings::BriefingService;
pub use clients::ClientService;
pub use comments::CommentService;
pub use dashboard::{DashboardService, DashboardSummary, UPCOMING_WINDOW_DAYS};
pub use deliverables::DeliverableService;
pub use events::EventService;
pub use team::TeamService;
pub use timeline::{GanttRow, TimelineService, effective_status};

pub use crate::models::{
    NewBriefing, NewClient, NewComment, NewDeliverable, NewEvent, NewTeamMember,
    NewTimelineItem, NewUser,
};

use crate::storage::{Database, FromRecord, SqlValue};
use crate::{Error, Result};

/// Builds the error for a missing row.
pub(crate) fn not_found(entity: &'static str, id: &str) -> Error {
    Error::NotFound {
        entity,
        id: id.to_string(),
    }
}

/// Returns `true` if `table` has a row with primary key `id`.
///
/// Always reads the file so a cached miss cannot hide a fresh insert.
pub(crate) fn row_exists(db: &Database, table: &str, id: &str) -> Result<bool> {
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE id = ?1");
    Ok(db.count(&sql, &[SqlValue::from(id)])? > 0)
}

/// Fails with [`Error::NotFound`] unless the row exists.
pub(crate) fn ensure_exists(db: &Database, table: &str, entity: &'static str, id: &str) -> Result<()> {
    if row_exists(db, table, id)? {
        Ok(())
    } else {
        Err(not_found(entity, id))
    }
}

/// Reads a row straight from the file and maps it.
///
/// Used after writes, where a cached copy could predate the change.
pub(crate) fn fetch_fresh<T: FromRecord>(
    db: &Database,
    sql: &str,
    entity: &'static str,
    id: &str,
) -> Result<T> {
    db.read_uncached(sql, &[SqlValue::from(id)])?
        .first()
        .map(T::from_record)
        .transpose()?
        .ok_or_else(|| not_found(entity, id))
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::storage::Database;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Opens a migrated database in a fresh temporary directory.
    pub fn open_db() -> (TempDir, Arc<Database>) {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path().join("data").join("gonetwork.db")).unwrap();
        (dir, Arc::new(db))
    }
}
