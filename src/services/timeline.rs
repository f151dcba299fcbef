//! Event timelines and Gantt rows.

use super::{ensure_exists, fetch_fresh, not_found};
use crate::Result;
use crate::format::{duration, parse_iso};
use crate::models::{ItemStatus, NewTimelineItem, Priority, TimelineItem, join_list, new_id, now_iso};
use crate::sql_params;
use crate::storage::Database;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

const SELECT_ITEM: &str = "SELECT id, event_id, title, start_time, end_time, responsible_id, \
     status, priority, color, dependencies FROM timeline_items";

/// Status to display for `item` at `now`: open items past their end are late.
#[must_use]
pub fn effective_status(item: &TimelineItem, now: NaiveDateTime) -> ItemStatus {
    if item.status.is_closed() || item.status == ItemStatus::Late {
        return item.status;
    }
    match parse_iso(&item.end_time) {
        Some(end) if end < now => ItemStatus::Late,
        _ => item.status,
    }
}

/// One bar of a Gantt chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GanttRow {
    /// Item id.
    pub id: String,
    /// Bar label.
    pub title: String,
    /// ISO-8601 start.
    pub start: String,
    /// ISO-8601 end.
    pub end: String,
    /// Responsible member name, if assigned.
    pub responsible: Option<String>,
    /// Status at the time the rows were built.
    pub status: ItemStatus,
    /// Priority.
    pub priority: Priority,
    /// Bar color.
    pub color: String,
    /// Ids this bar waits for.
    pub dependencies: Vec<String>,
    /// Span label such as `02:30` or `1d 02:00`.
    pub duration: String,
}

/// Service for timeline items.
pub struct TimelineService {
    db: Arc<Database>,
}

impl TimelineService {
    /// Creates a service over `db`.
    #[must_use]
    pub const fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Schedules an item on an existing event.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] for blank fields or a bad span,
    /// [`crate::Error::NotFound`] if the event is missing, or a storage error.
    #[instrument(skip(self, request), fields(event_id = %request.event_id, title = %request.title))]
    pub fn create(&self, request: NewTimelineItem) -> Result<TimelineItem> {
        request.validate()?;
        ensure_exists(&self.db, "events", "event", &request.event_id)?;
        let id = new_id();
        self.db.write(
            "INSERT INTO timeline_items (id, event_id, title, start_time, end_time, responsible_id, \
             status, priority, color, dependencies, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            &sql_params![
                id.as_str(),
                request.event_id.as_str(),
                request.title.trim(),
                request.start_time.trim(),
                request.end_time.trim(),
                request.responsible_id,
                request.status,
                request.priority,
                request.color,
                join_list(&request.dependencies),
                now_iso()
            ],
        )?;
        self.fetch(&id)
    }

    /// Lists the items of an event by start time.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn list_for_event(&self, event_id: &str) -> Result<Vec<TimelineItem>> {
        self.db.read_as(
            &format!("{SELECT_ITEM} WHERE event_id = ?1 ORDER BY start_time, title"),
            &sql_params![event_id],
        )
    }

    /// Sets the stored status.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] when absent, or a storage error.
    #[instrument(skip(self))]
    pub fn update_status(&self, id: &str, status: ItemStatus) -> Result<TimelineItem> {
        if !self.db.write(
            "UPDATE timeline_items SET status = ?2 WHERE id = ?1",
            &sql_params![id, status],
        )? {
            return Err(not_found("timeline item", id));
        }
        self.fetch(id)
    }

    /// Deletes an item.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] when absent, or a storage error.
    pub fn delete(&self, id: &str) -> Result<()> {
        if self
            .db
            .write("DELETE FROM timeline_items WHERE id = ?1", &sql_params![id])?
        {
            Ok(())
        } else {
            Err(not_found("timeline item", id))
        }
    }

    /// Builds Gantt rows for an event as seen at `now`.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn gantt(&self, event_id: &str, now: NaiveDateTime) -> Result<Vec<GanttRow>> {
        let names: Vec<(String, String)> = self
            .db
            .read(
                "SELECT tm.id, tm.name FROM team_members tm \
                 JOIN timeline_items ti ON ti.responsible_id = tm.id WHERE ti.event_id = ?1",
                &sql_params![event_id],
            )?
            .iter()
            .map(|r| -> Result<(String, String)> { Ok((r.text("id")?, r.text("name")?)) })
            .collect::<Result<_>>()?;

        Ok(self
            .list_for_event(event_id)?
            .into_iter()
            .map(|item| {
                let status = effective_status(&item, now);
                let responsible = item.responsible_id.as_ref().and_then(|rid| {
                    names
                        .iter()
                        .find(|(id, _)| id == rid)
                        .map(|(_, name)| name.clone())
                });
                GanttRow {
                    duration: duration(item.start_time.as_str(), item.end_time.as_str()),
                    color: item
                        .color
                        .clone()
                        .unwrap_or_else(|| status.default_color().to_string()),
                    id: item.id,
                    title: item.title,
                    start: item.start_time,
                    end: item.end_time,
                    responsible,
                    status,
                    priority: item.priority,
                    dependencies: item.dependencies,
                }
            })
            .collect())
    }

    fn fetch(&self, id: &str) -> Result<TimelineItem> {
        fetch_fresh(&self.db, &format!("{SELECT_ITEM} WHERE id = ?1"), "timeline item", id)
    }
}
