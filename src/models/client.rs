//! Client companies.

use super::{AccessLevel, require_text};
use crate::Result;
use crate::storage::{FromRecord, Record};
use serde::{Deserialize, Serialize};

/// A client company, optionally with a portal login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Primary key.
    pub id: String,
    /// Company name.
    pub company: String,
    /// Main contact person.
    pub contact_name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Portal login name, if system access was granted.
    pub username: Option<String>,
    /// SHA-256 hex digest of the portal password.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Portal access level.
    pub access_level: Option<AccessLevel>,
    /// ISO-8601 creation time.
    pub created_at: String,
}

impl Client {
    /// Returns `true` if the client can log into the portal.
    #[must_use]
    pub const fn has_system_access(&self) -> bool {
        self.username.is_some() && self.password_hash.is_some()
    }
}

impl FromRecord for Client {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: record.text("id")?,
            company: record.text("company")?,
            contact_name: record.opt_text("contact_name")?,
            email: record.opt_text("email")?,
            phone: record.opt_text("phone")?,
            username: record.opt_text("username")?,
            password_hash: record.opt_text("password_hash")?,
            access_level: record
                .opt_text("access_level")?
                .and_then(|level| AccessLevel::parse(&level)),
            created_at: record.opt_text("created_at")?.unwrap_or_default(),
        })
    }
}

/// Fields for a new client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    /// Company name (required).
    pub company: String,
    /// Main contact person.
    pub contact_name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
}

impl NewClient {
    /// Starts a request for `company`.
    #[must_use]
    pub fn new(company: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            ..Self::default()
        }
    }

    /// Sets the contact person.
    #[must_use]
    pub fn with_contact(mut self, name: impl Into<String>) -> Self {
        self.contact_name = Some(name.into());
        self
    }

    /// Sets the contact email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the contact phone.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] when the company is blank.
    pub fn validate(&self) -> Result<()> {
        require_text("company", &self.company)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqlValue;

    #[test]
    fn test_from_record_with_portal_login() {
        let record = Record::from_pairs([
            ("id", SqlValue::from("c1")),
            ("company", SqlValue::from("Acme")),
            ("contact_name", SqlValue::Null),
            ("username", SqlValue::from("acme")),
            ("password_hash", SqlValue::from("ab12")),
            ("access_level", SqlValue::from("cliente")),
            ("created_at", SqlValue::from("2025-01-01T10:00:00")),
        ]);
        let client = Client::from_record(&record).unwrap();
        assert_eq!(client.company, "Acme");
        assert!(client.has_system_access());
        assert_eq!(client.access_level, Some(AccessLevel::Client));
        assert!(!serde_json::to_string(&client).unwrap().contains("ab12"));
    }

    #[test]
    fn test_validate() {
        assert!(NewClient::new("Acme").with_email("ops@acme.test").validate().is_ok());
        assert!(NewClient::new(" ").validate().is_err());
    }
}
