//! Crew members and event assignments.

use super::{ensure_exists, fetch_fresh, not_found};
use crate::Result;
use crate::models::{EventTeamMember, NewTeamMember, TeamMember, new_id, now_iso};
use crate::sql_params;
use crate::storage::Database;
use std::sync::Arc;
use tracing::instrument;

const SELECT_MEMBER: &str = "SELECT id, name, role, department, email, active FROM team_members";

/// Service for team members.
pub struct TeamService {
    db: Arc<Database>,
}

impl TeamService {
    /// Creates a service over `db`.
    #[must_use]
    pub const fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Adds a member.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] for a blank name, or a storage error.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub fn create_member(&self, request: NewTeamMember) -> Result<TeamMember> {
        request.validate()?;
        let id = new_id();
        self.db.write(
            "INSERT INTO team_members (id, name, role, department, email, active, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
            &sql_params![
                id.as_str(),
                request.name.trim(),
                request.role.trim(),
                request.department,
                request.email,
                now_iso()
            ],
        )?;
        fetch_fresh(&self.db, &format!("{SELECT_MEMBER} WHERE id = ?1"), "team member", &id)
    }

    /// Lists active members by name.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn list_active(&self) -> Result<Vec<TeamMember>> {
        self.db.read_as(
            &format!("{SELECT_MEMBER} WHERE active = 1 ORDER BY name COLLATE NOCASE"),
            &[],
        )
    }

    /// Hides a member from pickers without deleting history.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] when absent, or a storage error.
    #[instrument(skip(self))]
    pub fn deactivate(&self, id: &str) -> Result<()> {
        if self
            .db
            .write("UPDATE team_members SET active = 0 WHERE id = ?1", &sql_params![id])?
        {
            Ok(())
        } else {
            Err(not_found("team member", id))
        }
    }

    /// Assigns a member to an event, replacing the role of an existing
    /// assignment.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if the event or member is missing,
    /// or a storage error.
    #[instrument(skip(self))]
    pub fn assign(&self, event_id: &str, member_id: &str, role: &str) -> Result<()> {
        ensure_exists(&self.db, "events", "event", event_id)?;
        ensure_exists(&self.db, "team_members", "team member", member_id)?;
        self.db.write(
            "INSERT INTO event_team_members (event_id, member_id, role) VALUES (?1, ?2, ?3) \
             ON CONFLICT (event_id, member_id) DO UPDATE SET role = excluded.role",
            &sql_params![event_id, member_id, role.trim()],
        )?;
        Ok(())
    }

    /// Removes an assignment, returning whether one existed.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn unassign(&self, event_id: &str, member_id: &str) -> Result<bool> {
        self.db.write(
            "DELETE FROM event_team_members WHERE event_id = ?1 AND member_id = ?2",
            &sql_params![event_id, member_id],
        )
    }

    /// Lists the crew of an event.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn event_team(&self, event_id: &str) -> Result<Vec<EventTeamMember>> {
        self.db.read_as(
            "SELECT etm.event_id, etm.member_id, tm.name, etm.role \
             FROM event_team_members etm JOIN team_members tm ON tm.id = etm.member_id \
             WHERE etm.event_id = ?1 ORDER BY tm.name COLLATE NOCASE",
            &sql_params![event_id],
        )
    }
}
