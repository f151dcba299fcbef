//! Staff user accounts.

use super::{AccessLevel, enum_column, require_text};
use crate::Result;
use crate::storage::{FromRecord, Record};
use serde::{Deserialize, Serialize};

/// A staff login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Primary key.
    pub id: String,
    /// Login name.
    pub username: String,
    /// SHA-256 hex digest of the password.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Access level.
    pub access_level: AccessLevel,
    /// Disabled accounts cannot log in.
    pub active: bool,
}

impl FromRecord for User {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: record.text("id")?,
            username: record.text("username")?,
            password_hash: record.text("password_hash")?,
            name: record.opt_text("name")?.unwrap_or_default(),
            email: record.opt_text("email")?,
            access_level: enum_column(record, "access_level", AccessLevel::parse)?,
            active: record.boolean("active")?,
        })
    }
}

/// Fields for a new user. The password is hashed by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Login name (required).
    pub username: String,
    /// Plain-text password (required).
    pub password: String,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Access level.
    pub access_level: AccessLevel,
}

impl NewUser {
    /// Creates a request.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        access_level: AccessLevel,
    ) -> Self {
        let username = username.into();
        Self {
            name: username.clone(),
            username,
            password: password.into(),
            email: None,
            access_level,
        }
    }

    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] for a blank username or password.
    pub fn validate(&self) -> Result<()> {
        require_text("username", &self.username)?;
        require_text("password", &self.password)
    }
}
