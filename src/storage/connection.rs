//! Connection handling for the application database.
//!
//! Covers database path resolution, per-call connection setup, mutex poison
//! recovery for in-process shared state, and mapping of `rusqlite` failures
//! onto the crate's error taxonomy.

use crate::{Error, Result};
use rusqlite::{Connection, ErrorCode, OpenFlags};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Database file name inside a `data/` directory.
pub const DATABASE_FILE: &str = "gonetwork.db";

/// Directory that holds the database relative to an application root.
pub const DATA_DIR: &str = "data";

/// Directory used by old setup scripts. Never opened; only reported.
pub const LEGACY_DATA_DIR: &str = "database";

/// Busy timeout applied to every connection, in milliseconds.
const BUSY_TIMEOUT_MS: &str = "5000";

/// Helper to acquire mutex lock with poison recovery.
///
/// If the mutex is poisoned (due to a panic in a previous critical section),
/// the inner value is recovered and a warning logged, so one panicking
/// caller cannot take the cache down for everyone else.
pub fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("Mutex was poisoned, recovering");
            metrics::counter!("gonetwork_mutex_poison_recovery_total").increment(1);
            poisoned.into_inner()
        },
    }
}

/// Configures a `SQLite` connection.
///
/// # Configuration Applied
///
/// - **`foreign_keys`**: `REFERENCES` clauses are enforced
/// - **WAL mode**: readers do not block the single writer
/// - **NORMAL synchronous**: balances durability with performance
/// - **`busy_timeout`**: waits up to 5 seconds on lock contention, which is the
///   only serialization between concurrent writers
///
/// # Errors
///
/// Returns [`Error::ConnectionFailed`] if foreign keys cannot be enabled.
pub fn configure_connection(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(|e| Error::ConnectionFailed {
            path: conn.path().unwrap_or_default().to_string(),
            cause: e.to_string(),
        })?;
    // journal_mode returns a row, and in-memory databases refuse WAL; both are fine to ignore
    let _ = conn.pragma_update(None, "journal_mode", "WAL");
    let _ = conn.pragma_update(None, "synchronous", "NORMAL");
    let _ = conn.pragma_update(None, "busy_timeout", BUSY_TIMEOUT_MS);

    Ok(())
}

/// How a connection is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// The file must already exist.
    Existing,
    /// The file (and its parent directory) are created when missing.
    Create,
}

/// Opens and configures a connection to `path`.
///
/// # Errors
///
/// Returns [`Error::ConnectionFailed`] if the parent directory cannot be
/// created, the file is missing in [`OpenMode::Existing`], or `SQLite` refuses
/// to open it.
pub fn open_connection(path: &Path, mode: OpenMode) -> Result<Connection> {
    let connection_failed = |cause: String| Error::ConnectionFailed {
        path: path.display().to_string(),
        cause,
    };

    let flags = match mode {
        OpenMode::Existing => {
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX
        },
        OpenMode::Create => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| connection_failed(e.to_string()))?;
            }
            OpenFlags::default()
        },
    };

    let conn = Connection::open_with_flags(path, flags).map_err(|e| connection_failed(e.to_string()))?;
    configure_connection(&conn)?;
    Ok(conn)
}

/// Maps a `rusqlite` failure onto the crate error taxonomy.
///
/// Constraint failures become [`Error::ConstraintViolated`]; files that
/// cannot be opened or are not databases become [`Error::ConnectionFailed`];
/// everything else is [`Error::QueryFailed`].
#[must_use]
pub fn classify_error(path: &Path, operation: &str, err: &rusqlite::Error) -> Error {
    let code = match err {
        rusqlite::Error::SqliteFailure(e, _) => Some(e.code),
        _ => None,
    };
    match code {
        Some(ErrorCode::ConstraintViolation) => Error::ConstraintViolated {
            operation: operation.to_string(),
            cause: err.to_string(),
        },
        Some(
            ErrorCode::CannotOpen
            | ErrorCode::NotADatabase
            | ErrorCode::DatabaseCorrupt
            | ErrorCode::PermissionDenied,
        ) => Error::ConnectionFailed {
            path: path.display().to_string(),
            cause: err.to_string(),
        },
        _ => Error::QueryFailed {
            operation: operation.to_string(),
            cause: err.to_string(),
        },
    }
}

/// Candidate database locations.
///
/// An explicitly configured path always wins. Otherwise the primary
/// (`<app-root>/data/gonetwork.db`) is used if it exists, then the secondary
/// (`<web-root>/data/gonetwork.db`) if it exists, and finally the primary
/// unconditionally so a fresh install creates the file there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabasePaths {
    /// Explicit override from configuration or environment.
    pub explicit: Option<PathBuf>,
    /// Desktop application location.
    pub primary: PathBuf,
    /// Web application location.
    pub secondary: PathBuf,
}

impl DatabasePaths {
    /// Builds the candidates for an application root and a web root.
    #[must_use]
    pub fn new(app_root: impl AsRef<Path>, web_root: impl AsRef<Path>) -> Self {
        Self {
            explicit: None,
            primary: app_root.as_ref().join(DATA_DIR).join(DATABASE_FILE),
            secondary: web_root.as_ref().join(DATA_DIR).join(DATABASE_FILE),
        }
    }

    /// Builds the candidates for the conventional layout where the web
    /// front end lives in `<app-root>/web`.
    #[must_use]
    pub fn for_root(app_root: impl AsRef<Path>) -> Self {
        let root = app_root.as_ref();
        Self::new(root, root.join("web"))
    }

    /// Sets an explicit path that overrides both candidates.
    #[must_use]
    pub fn with_explicit(mut self, path: Option<PathBuf>) -> Self {
        self.explicit = path;
        self
    }

    /// Resolves the path to use.
    #[must_use]
    pub fn resolve(&self) -> PathBuf {
        if let Some(explicit) = &self.explicit {
            return explicit.clone();
        }
        if self.primary.exists() {
            return self.primary.clone();
        }
        if self.secondary.exists() {
            return self.secondary.clone();
        }
        self.primary.clone()
    }

    /// Returns the legacy `database/gonetwork.db` location if a file exists
    /// there. Its presence means an old script wrote to the wrong place.
    #[must_use]
    pub fn legacy_file(&self) -> Option<PathBuf> {
        let root = self.primary.parent()?.parent()?;
        let legacy = root.join(LEGACY_DATA_DIR).join(DATABASE_FILE);
        legacy.exists().then_some(legacy)
    }
}
