//! # `GoNetwork`
//!
//! Data-access and session-state core for the `GoNetwork` AI event-production
//! management tool.
//!
//! Presentation layers (desktop windows, web pages) stay thin: they call the
//! typed services or the [`storage::Database`] façade, format fields through
//! [`format`], and keep per-user state in a [`session::Session`].
//!
//! ## Features
//!
//! - Single `SQLite` file with versioned schema migrations
//! - Query façade with a TTL result cache and write invalidation
//! - Typed entity services for clients, events, briefings, timelines and deliverables
//! - Explicit session context with inactivity timeout and notifications
//! - Total display formatters for dates, statuses and Brazilian currency
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gonetwork::services::{ClientService, NewClient};
//! use gonetwork::storage::Database;
//!
//! let db = Arc::new(Database::open("data/gonetwork.db")?);
//! let clients = ClientService::new(Arc::clone(&db));
//! let acme = clients.create(NewClient::new("Acme"))?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod format;
pub mod models;
pub mod notifications;
pub mod observability;
pub mod services;
pub mod session;
pub mod storage;

// Re-exports for convenience
pub use config::{AppConfig, LoadedConfig};
pub use notifications::{Notification, NotificationStore, Severity};
pub use session::{Session, SessionKey, SessionValue, UserIdentity};
pub use storage::{Database, Record, SqlValue};

/// Error type for gonetwork operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Empty names, progress outside 0..=100, unknown status strings |
/// | `NotFound` | A referenced client/event/item does not exist |
/// | `ConnectionFailed` | The database file cannot be opened or is not a database |
/// | `QueryFailed` | Bad SQL, missing tables, disk or I/O errors during execution |
/// | `ConstraintViolated` | `UNIQUE`/`FOREIGN KEY` failures or a blocked delete |
/// | `InvalidRecord` | A row cannot be mapped onto an entity struct |
/// | `Unauthorized` | Wrong credentials or an inactive account |
/// | `OperationFailed` | Config, logging or filesystem failures outside SQL |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A referenced entity does not exist.
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// Entity kind (e.g. `"event"`).
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// The database could not be opened.
    ///
    /// Raised when:
    /// - The file is missing on a read-only open
    /// - The parent directory cannot be created
    /// - The file is not a `SQLite` database
    #[error("cannot open database '{path}': {cause}")]
    ConnectionFailed {
        /// Database path.
        path: String,
        /// The underlying cause.
        cause: String,
    },

    /// A statement failed to prepare or execute.
    #[error("query '{operation}' failed: {cause}")]
    QueryFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A referential or uniqueness rule rejected the operation.
    ///
    /// Raised both for `SQLite` constraint errors and for the manual
    /// pre-checks done before deleting clients and events.
    #[error("constraint violated in '{operation}': {cause}")]
    ConstraintViolated {
        /// The operation that was rejected.
        operation: String,
        /// Which rule was violated.
        cause: String,
    },

    /// A row could not be mapped onto a typed record.
    #[error("invalid record: column '{column}': {cause}")]
    InvalidRecord {
        /// Column name.
        column: String,
        /// Why the value was rejected.
        cause: String,
    },

    /// Authentication failed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A non-SQL operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Returns `true` for errors raised by the storage layer.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::QueryFailed { .. } | Self::ConstraintViolated { .. }
        )
    }
}

/// Result type alias for gonetwork operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in seconds.
///
/// Falls back to 0 if the system clock is before the Unix epoch.
///
/// ```rust
/// use gonetwork::current_timestamp;
///
/// assert!(current_timestamp() > 0);
/// ```
#[must_use]
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("test error".to_string());
        assert_eq!(err.to_string(), "invalid input: test error");

        let err = Error::QueryFailed {
            operation: "read".to_string(),
            cause: "no such table: events".to_string(),
        };
        assert_eq!(err.to_string(), "query 'read' failed: no such table: events");

        let err = Error::NotFound {
            entity: "event",
            id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "event 'abc' not found");
    }

    #[test]
    fn test_is_storage() {
        let err = Error::ConstraintViolated {
            operation: "delete_client".to_string(),
            cause: "events reference client".to_string(),
        };
        assert!(err.is_storage());
        assert!(!Error::Unauthorized("bad password".to_string()).is_storage());
    }
}
