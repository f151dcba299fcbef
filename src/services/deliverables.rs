//! Deliverable tracking.

use super::{ensure_exists, fetch_fresh, not_found};
use crate::Result;
use crate::models::{
    Deliverable, DeliverableStatus, NewDeliverable, new_id, now_iso, status_for_progress,
    validate_progress,
};
use crate::sql_params;
use crate::storage::Database;
use chrono::{Days, NaiveDate};
use std::sync::Arc;
use tracing::instrument;

const SELECT_DELIVERABLE: &str =
    "SELECT id, event_id, client_id, title, deadline, status, progress FROM deliverables";

/// Service for deliverables.
pub struct DeliverableService {
    db: Arc<Database>,
}

impl DeliverableService {
    /// Creates a service over `db`.
    #[must_use]
    pub const fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Creates a deliverable. Full initial progress stores it as completed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] for blank fields or progress
    /// outside `0..=100`, [`crate::Error::NotFound`] for a missing event or
    /// client, or a storage error.
    #[instrument(skip(self, request), fields(event_id = %request.event_id, title = %request.title))]
    pub fn create(&self, request: NewDeliverable) -> Result<Deliverable> {
        let progress = request.validate()?;
        ensure_exists(&self.db, "events", "event", &request.event_id)?;
        if let Some(client_id) = &request.client_id {
            ensure_exists(&self.db, "clients", "client", client_id)?;
        }
        let id = new_id();
        self.db.write(
            "INSERT INTO deliverables (id, event_id, client_id, title, deadline, status, progress, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            &sql_params![
                id.as_str(),
                request.event_id.as_str(),
                request.client_id,
                request.title.trim(),
                request.deadline,
                status_for_progress(progress, request.status),
                progress,
                now_iso()
            ],
        )?;
        self.fetch(&id)
    }

    /// Looks a deliverable up.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] when absent, or a storage error.
    pub fn get(&self, id: &str) -> Result<Deliverable> {
        self.db
            .read_one_as(&format!("{SELECT_DELIVERABLE} WHERE id = ?1"), &sql_params![id])?
            .ok_or_else(|| not_found("deliverable", id))
    }

    /// Lists the deliverables of an event by deadline.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn list_for_event(&self, event_id: &str) -> Result<Vec<Deliverable>> {
        self.db.read_as(
            &format!(
                "{SELECT_DELIVERABLE} WHERE event_id = ?1 \
                 ORDER BY deadline IS NULL, deadline, title"
            ),
            &sql_params![event_id],
        )
    }

    /// Lists every deliverable by deadline.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn list(&self) -> Result<Vec<Deliverable>> {
        self.db.read_as(
            &format!("{SELECT_DELIVERABLE} ORDER BY deadline IS NULL, deadline, title"),
            &[],
        )
    }

    /// Records progress. Reaching 100 marks the deliverable completed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] outside `0..=100`,
    /// [`crate::Error::NotFound`] when absent, or a storage error.
    #[instrument(skip(self))]
    pub fn update_progress(&self, id: &str, progress: i64) -> Result<Deliverable> {
        let progress = validate_progress(progress)?;
        let current = self.fetch(id)?;
        let status = status_for_progress(progress, current.status);
        self.db.write(
            "UPDATE deliverables SET progress = ?2, status = ?3 WHERE id = ?1",
            &sql_params![id, progress, status],
        )?;
        if status != current.status {
            tracing::info!(deliverable_id = %id, status = %status, "Deliverable status changed");
        }
        self.fetch(id)
    }

    /// Sets the status.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] when absent, or a storage error.
    #[instrument(skip(self))]
    pub fn update_status(&self, id: &str, status: DeliverableStatus) -> Result<Deliverable> {
        if !self.db.write(
            "UPDATE deliverables SET status = ?2 WHERE id = ?1",
            &sql_params![id, status],
        )? {
            return Err(not_found("deliverable", id));
        }
        self.fetch(id)
    }

    /// Deletes a deliverable.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] when absent, or a storage error.
    pub fn delete(&self, id: &str) -> Result<()> {
        if self
            .db
            .write("DELETE FROM deliverables WHERE id = ?1", &sql_params![id])?
        {
            Ok(())
        } else {
            Err(not_found("deliverable", id))
        }
    }

    /// Open deliverables whose deadline is before `today`.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn overdue(&self, today: NaiveDate) -> Result<Vec<Deliverable>> {
        self.open_with_deadline(
            "substr(deadline, 1, 10) < ?1",
            &sql_params![day(today)],
        )
    }

    /// Open deliverables due between `today` and `today + days`, inclusive.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn upcoming(&self, today: NaiveDate, days: u64) -> Result<Vec<Deliverable>> {
        let until = today.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX);
        self.open_with_deadline(
            "substr(deadline, 1, 10) BETWEEN ?1 AND ?2",
            &sql_params![day(today), day(until)],
        )
    }

    fn open_with_deadline(
        &self,
        condition: &str,
        params: &[crate::storage::SqlValue],
    ) -> Result<Vec<Deliverable>> {
        let all: Vec<Deliverable> = self.db.read_as(
            &format!(
                "{SELECT_DELIVERABLE} WHERE deadline IS NOT NULL AND deadline <> '' \
                 AND {condition} ORDER BY deadline, title"
            ),
            params,
        )?;
        Ok(all.into_iter().filter(|d| !d.status.is_closed()).collect())
    }

    fn fetch(&self, id: &str) -> Result<Deliverable> {
        fetch_fresh(
            &self.db,
            &format!("{SELECT_DELIVERABLE} WHERE id = ?1"),
            "deliverable",
            id,
        )
    }
}

fn day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::services::{EventService, NewEvent};

    fn setup() -> (tempfile::TempDir, Arc<Database>, DeliverableService, String) {
        let (dir, db) = crate::services::test_support::open_db();
        let gala = EventService::new(Arc::clone(&db))
            .create(NewEvent::new("Gala", "2025-06-01"))
            .unwrap();
        let service = DeliverableService::new(Arc::clone(&db));
        (dir, db, service, gala.id)
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_progress_validation_and_promotion() {
        let (_dir, _db, service, event_id) = setup();
        let err = service
            .create(NewDeliverable::new(&event_id, "Teaser").with_progress(120))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let done = service
            .create(NewDeliverable::new(&event_id, "Photos").with_progress(100))
            .unwrap();
        assert_eq!(done.status, DeliverableStatus::Completed);

        let teaser = service.create(NewDeliverable::new(&event_id, "Teaser")).unwrap();
        let halfway = service.update_progress(&teaser.id, 50).unwrap();
        assert_eq!(halfway.status, DeliverableStatus::Pending);
        let finished = service.update_progress(&teaser.id, 100).unwrap();
        assert_eq!(finished.status, DeliverableStatus::Completed);
        assert_eq!(finished.progress, 100);
        assert!(service.update_progress(&teaser.id, -5).is_err());
    }

    #[test]
    fn test_event_with_deliverables_cannot_be_deleted() {
        let (_dir, db, service, event_id) = setup();
        service.create(NewDeliverable::new(&event_id, "Teaser")).unwrap();
        let err = EventService::new(db).delete(&event_id).unwrap_err();
        assert!(matches!(err, Error::ConstraintViolated { .. }));
    }

    #[test]
    fn test_overdue_and_upcoming() {
        let (_dir, _db, service, event_id) = setup();
        service
            .create(NewDeliverable::new(&event_id, "Late cut").due("2025-05-01"))
            .unwrap();
        let closed = service
            .create(NewDeliverable::new(&event_id, "Old photos").due("2025-04-01"))
            .unwrap();
        service.update_status(&closed.id, DeliverableStatus::Cancelled).unwrap();
        service
            .create(NewDeliverable::new(&event_id, "Teaser").due("2025-05-12T18:00:00"))
            .unwrap();
        service
            .create(NewDeliverable::new(&event_id, "Final").due("2025-07-01"))
            .unwrap();
        service.create(NewDeliverable::new(&event_id, "Someday")).unwrap();

        let today = date("2025-05-10");
        let overdue: Vec<String> = service
            .overdue(today)
            .unwrap()
            .into_iter()
            .map(|d| d.title)
            .collect();
        assert_eq!(overdue, ["Late cut"]);

        let upcoming: Vec<String> = service
            .upcoming(today, 7)
            .unwrap()
            .into_iter()
            .map(|d| d.title)
            .collect();
        assert_eq!(upcoming, ["Teaser"]);
    }
}
