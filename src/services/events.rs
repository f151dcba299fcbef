//! Event management.

use super::{ensure_exists, fetch_fresh, not_found};
use crate::models::{Event, EventStatus, NewEvent, join_list, new_id, now_iso};
use crate::sql_params;
use crate::storage::{Database, Statement};
use crate::{Error, Result};
use std::sync::Arc;
use tracing::instrument;

/// Tables whose rows are removed by `ON DELETE CASCADE` when an event goes.
const CASCADED_TABLES: &[&str] = &[
    "briefings",
    "timeline_items",
    "video_edits",
    "video_comments",
    "editor_deliveries",
];

const SELECT_EVENT: &str = "SELECT id, name, date, location, client_id, status, tags, \
     description, created_at FROM events";

/// Service for production events.
pub struct EventService {
    db: Arc<Database>,
}

impl EventService {
    /// Creates a service over `db`.
    #[must_use]
    pub const fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Creates an event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a blank name or bad date,
    /// [`Error::NotFound`] if the client does not exist, or a storage error.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub fn create(&self, request: NewEvent) -> Result<Event> {
        request.validate()?;
        if let Some(client_id) = &request.client_id {
            ensure_exists(&self.db, "clients", "client", client_id)?;
        }
        let id = new_id();
        self.db.write(
            "INSERT INTO events (id, name, date, location, client_id, status, tags, description, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            &sql_params![
                id.as_str(),
                request.name.trim(),
                request.date.trim(),
                request.location,
                request.client_id,
                request.status,
                join_list(&request.tags),
                request.description,
                now_iso()
            ],
        )?;
        tracing::info!(event_id = %id, "Event created");
        self.fetch(&id)
    }

    /// Looks an event up, returning `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn find(&self, id: &str) -> Result<Option<Event>> {
        self.db
            .read_one_as(&format!("{SELECT_EVENT} WHERE id = ?1"), &sql_params![id])
    }

    /// Looks an event up.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when absent, or a storage error.
    pub fn get(&self, id: &str) -> Result<Event> {
        self.find(id)?.ok_or_else(|| not_found("event", id))
    }

    /// Lists events, most recent date first.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn list(&self) -> Result<Vec<Event>> {
        self.db
            .read_as(&format!("{SELECT_EVENT} ORDER BY date DESC, name"), &[])
    }

    /// Lists events in one status.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn list_by_status(&self, status: EventStatus) -> Result<Vec<Event>> {
        self.db.read_as(
            &format!("{SELECT_EVENT} WHERE status = ?1 ORDER BY date DESC, name"),
            &sql_params![status],
        )
    }

    /// Lists the events of one client.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn list_for_client(&self, client_id: &str) -> Result<Vec<Event>> {
        self.db.read_as(
            &format!("{SELECT_EVENT} WHERE client_id = ?1 ORDER BY date DESC, name"),
            &sql_params![client_id],
        )
    }

    /// Moves an event to `status`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when absent, or a storage error.
    #[instrument(skip(self))]
    pub fn update_status(&self, id: &str, status: EventStatus) -> Result<Event> {
        let updated = self.db.write(
            "UPDATE events SET status = ?2 WHERE id = ?1",
            &sql_params![id, status],
        )?;
        if !updated {
            return Err(not_found("event", id));
        }
        self.fetch(id)
    }

    /// Replaces the tag list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when absent, or a storage error.
    #[instrument(skip(self, tags))]
    pub fn set_tags<S: AsRef<str>>(&self, id: &str, tags: &[S]) -> Result<Event> {
        let updated = self.db.write(
            "UPDATE events SET tags = ?2 WHERE id = ?1",
            &sql_params![id, join_list(tags)],
        )?;
        if !updated {
            return Err(not_found("event", id));
        }
        self.fetch(id)
    }

    /// Deletes an event with no deliverables, together with its team
    /// assignments. Briefings and timeline items cascade; comments stay.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConstraintViolated`] while deliverables reference the
    /// event, [`Error::NotFound`] when absent, or a storage error.
    #[instrument(skip(self))]
    pub fn delete(&self, id: &str) -> Result<()> {
        ensure_exists(&self.db, "events", "event", id)?;
        let deliverables = self.db.count(
            "SELECT COUNT(*) FROM deliverables WHERE event_id = ?1",
            &sql_params![id],
        )?;
        if deliverables > 0 {
            tracing::warn!(event_id = %id, deliverables, "Refusing to delete event with deliverables");
            return Err(Error::ConstraintViolated {
                operation: "delete_event".to_string(),
                cause: format!("{deliverables} deliverable(s) still reference event '{id}'"),
            });
        }
        self.db.write_batch(&[
            Statement::new(
                "DELETE FROM event_team_members WHERE event_id = ?1",
                sql_params![id],
            ),
            Statement::new("DELETE FROM events WHERE id = ?1", sql_params![id]),
        ])?;
        self.db.invalidate_tables(CASCADED_TABLES);
        tracing::info!(event_id = %id, "Event deleted");
        Ok(())
    }

    fn fetch(&self, id: &str) -> Result<Event> {
        fetch_fresh(&self.db, &format!("{SELECT_EVENT} WHERE id = ?1"), "event", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::open_db;
    use crate::services::{ClientService, NewClient};

    #[test]
    fn test_create_requires_existing_client() {
        let (_dir, db) = open_db();
        let events = EventService::new(db);
        let err = events
            .create(NewEvent::new("Gala", "2025-09-10").for_client("ghost"))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "client", .. }));
    }

    #[test]
    fn test_status_and_tags() {
        let (_dir, db) = open_db();
        let events = EventService::new(db);
        let gala = events
            .create(NewEvent::new("Gala", "2025-09-10").with_tags(["live"]))
            .unwrap();
        assert_eq!(gala.status, EventStatus::Planning);

        events.update_status(&gala.id, EventStatus::Confirmed).unwrap();
        let tagged = events.set_tags(&gala.id, &["live", "drone"]).unwrap();
        assert_eq!(tagged.status, EventStatus::Confirmed);
        assert_eq!(tagged.tags, ["live", "drone"]);

        assert_eq!(events.list_by_status(EventStatus::Confirmed).unwrap().len(), 1);
        assert!(events.list_by_status(EventStatus::Planning).unwrap().is_empty());
    }

    #[test]
    fn test_client_with_events_cannot_be_deleted() {
        let (_dir, db) = open_db();
        let clients = ClientService::new(Arc::clone(&db));
        let events = EventService::new(db);
        let acme = clients.create(NewClient::new("Acme")).unwrap();
        let gala = events
            .create(NewEvent::new("Gala", "2025-09-10").for_client(&acme.id))
            .unwrap();

        let err = clients.delete(&acme.id).unwrap_err();
        assert!(matches!(err, Error::ConstraintViolated { .. }));

        events.delete(&gala.id).unwrap();
        clients.delete(&acme.id).unwrap();
        assert!(events.find(&gala.id).unwrap().is_none());
    }
}
