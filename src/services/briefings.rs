//! Briefings.

use super::{ensure_exists, fetch_fresh, not_found};
use crate::Result;
use crate::models::{Briefing, NewBriefing, new_id, now_iso};
use crate::sql_params;
use crate::storage::Database;
use std::sync::Arc;
use tracing::instrument;

const SELECT_BRIEFING: &str = "SELECT id, event_id, project_name, delivery_date, content, \
     team_lead, created_at FROM briefings";

/// Service for event briefings.
pub struct BriefingService {
    db: Arc<Database>,
}

impl BriefingService {
    /// Creates a service over `db`.
    #[must_use]
    pub const fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Creates a briefing for an existing event.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] for blank fields,
    /// [`crate::Error::NotFound`] if the event is missing, or a storage error.
    #[instrument(skip(self, request), fields(event_id = %request.event_id))]
    pub fn create(&self, request: NewBriefing) -> Result<Briefing> {
        request.validate()?;
        ensure_exists(&self.db, "events", "event", &request.event_id)?;
        let id = new_id();
        self.db.write(
            "INSERT INTO briefings (id, event_id, project_name, delivery_date, content, team_lead, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            &sql_params![
                id.as_str(),
                request.event_id.as_str(),
                request.project_name.trim(),
                request.delivery_date,
                request.content,
                request.team_lead,
                now_iso()
            ],
        )?;
        self.fetch(&id)
    }

    /// Looks a briefing up.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] when absent, or a storage error.
    pub fn get(&self, id: &str) -> Result<Briefing> {
        self.db
            .read_one_as(&format!("{SELECT_BRIEFING} WHERE id = ?1"), &sql_params![id])?
            .ok_or_else(|| not_found("briefing", id))
    }

    /// Lists the briefings of an event, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn list_for_event(&self, event_id: &str) -> Result<Vec<Briefing>> {
        self.db.read_as(
            &format!("{SELECT_BRIEFING} WHERE event_id = ?1 ORDER BY created_at DESC"),
            &sql_params![event_id],
        )
    }

    /// Replaces the body.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] when absent, or a storage error.
    pub fn update_content(&self, id: &str, content: &str) -> Result<Briefing> {
        if !self.db.write(
            "UPDATE briefings SET content = ?2 WHERE id = ?1",
            &sql_params![id, content],
        )? {
            return Err(not_found("briefing", id));
        }
        self.fetch(id)
    }

    /// Deletes a briefing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] when absent, or a storage error.
    pub fn delete(&self, id: &str) -> Result<()> {
        if self
            .db
            .write("DELETE FROM briefings WHERE id = ?1", &sql_params![id])?
        {
            Ok(())
        } else {
            Err(not_found("briefing", id))
        }
    }

    fn fetch(&self, id: &str) -> Result<Briefing> {
        fetch_fresh(&self.db, &format!("{SELECT_BRIEFING} WHERE id = ?1"), "briefing", id)
    }
}
