//! Dashboard counters.

use super::DeliverableService;
use crate::Result;
use crate::models::{DeliverableStatus, EventStatus};
use crate::storage::Database;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Days ahead counted as "upcoming" on the dashboard.
pub const UPCOMING_WINDOW_DAYS: u64 = 7;

/// Headline numbers for the home page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    /// Number of clients.
    pub clients: i64,
    /// Number of events.
    pub events: i64,
    /// Events per status identifier. Unrecognised stored values are kept as-is.
    pub events_by_status: BTreeMap<String, i64>,
    /// Number of deliverables.
    pub deliverables: i64,
    /// Deliverables stored as completed.
    pub deliverables_completed: i64,
    /// Open deliverables past their deadline.
    pub deliverables_overdue: usize,
    /// Open deliverables due within the upcoming window.
    pub deliverables_upcoming: usize,
}

/// Service computing dashboard counters.
pub struct DashboardService {
    db: Arc<Database>,
}

impl DashboardService {
    /// Creates a service over `db`.
    #[must_use]
    pub const fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Computes the summary as of `today`.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn summary(&self, today: NaiveDate) -> Result<DashboardSummary> {
        let mut events_by_status = BTreeMap::new();
        for row in self
            .db
            .read("SELECT status, COUNT(*) AS n FROM events GROUP BY status", &[])?
        {
            let raw = row.opt_text("status")?.unwrap_or_default();
            let key = EventStatus::parse(&raw).map_or(raw, |s| s.as_str().to_string());
            *events_by_status.entry(key).or_insert(0) += row.integer("n")?;
        }

        let completed = self
            .db
            .read("SELECT status FROM deliverables", &[])?
            .iter()
            .filter(|r| {
                r.opt_text("status")
                    .ok()
                    .flatten()
                    .and_then(|s| DeliverableStatus::parse(&s))
                    == Some(DeliverableStatus::Completed)
            })
            .count();

        let deliverables = DeliverableService::new(Arc::clone(&self.db));
        Ok(DashboardSummary {
            clients: self.db.count("SELECT COUNT(*) FROM clients", &[])?,
            events: events_by_status.values().sum(),
            events_by_status,
            deliverables: self.db.count("SELECT COUNT(*) FROM deliverables", &[])?,
            deliverables_completed: i64::try_from(completed).unwrap_or(i64::MAX),
            deliverables_overdue: deliverables.overdue(today)?.len(),
            deliverables_upcoming: deliverables.upcoming(today, UPCOMING_WINDOW_DAYS)?.len(),
        })
    }
}
