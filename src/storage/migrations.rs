//! `SQLite` migration system for schema management.
//!
//! Migrations are compiled into the binary and applied in version order.
//! Applied versions are recorded in `schema_migrations`, so running the
//! migrator again is a no-op.
//!
//! # Usage
//!
//! ```rust,ignore
//! use gonetwork::storage::migrations::{Migration, MigrationRunner};
//!
//! const MIGRATIONS: &[Migration] = &[Migration {
//!     version: 1,
//!     description: "Initial table",
//!     sql: "CREATE TABLE IF NOT EXISTS events (id TEXT PRIMARY KEY);",
//! }];
//!
//! let mut conn = rusqlite::Connection::open("data/gonetwork.db")?;
//! MigrationRunner::new(&mut conn).run(MIGRATIONS)?;
//! ```

use crate::{Error, Result};
use rusqlite::{Connection, params};

/// Name of the table that records applied migrations.
pub const MIGRATIONS_TABLE: &str = "schema_migrations";

/// A single migration with version and SQL.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    /// Migration version (sequential, starting at 1).
    pub version: i32,
    /// Human-readable description.
    pub description: &'static str,
    /// SQL to apply (may contain multiple statements).
    pub sql: &'static str,
}

/// Applies migrations to one connection.
pub struct MigrationRunner<'a> {
    conn: &'a mut Connection,
}

impl<'a> MigrationRunner<'a> {
    /// Creates a runner for `conn`.
    pub const fn new(conn: &'a mut Connection) -> Self {
        Self { conn }
    }

    /// Runs all pending migrations, returning how many were applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the tracking table cannot be created or a
    /// migration fails. A failed migration leaves no partial changes.
    pub fn run(&mut self, migrations: &[Migration]) -> Result<usize> {
        self.ensure_migrations_table()?;
        let current = self.current_version()?;

        let mut pending: Vec<&Migration> =
            migrations.iter().filter(|m| m.version > current).collect();
        pending.sort_by_key(|m| m.version);

        for migration in &pending {
            self.apply_migration(migration)?;
        }

        Ok(pending.len())
    }

    /// Returns the highest applied version, or 0 on a fresh database.
    ///
    /// # Errors
    ///
    /// Returns an error if the tracking table cannot be queried.
    pub fn current_version(&self) -> Result<i32> {
        let exists: bool = self
            .conn
            .query_row(
                "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
                params![MIGRATIONS_TABLE],
                |row| row.get(0),
            )
            .map_err(|e| Error::QueryFailed {
                operation: "migration_table_exists".to_string(),
                cause: e.to_string(),
            })?;
        if !exists {
            return Ok(0);
        }

        self.conn
            .query_row(
                &format!("SELECT COALESCE(MAX(version), 0) FROM {MIGRATIONS_TABLE}"),
                [],
                |row| row.get(0),
            )
            .map_err(|e| Error::QueryFailed {
                operation: "migration_current_version".to_string(),
                cause: e.to_string(),
            })
    }

    fn ensure_migrations_table(&self) -> Result<()> {
        self.conn
            .execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {MIGRATIONS_TABLE} (
                    version INTEGER PRIMARY KEY,
                    description TEXT NOT NULL,
                    applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%S', 'now'))
                )"
            ))
            .map_err(|e| Error::QueryFailed {
                operation: "create_migrations_table".to_string(),
                cause: e.to_string(),
            })
    }

    /// Applies a single migration and records it in one transaction.
    fn apply_migration(&mut self, migration: &Migration) -> Result<()> {
        let tx = self.conn.transaction().map_err(|e| Error::QueryFailed {
            operation: format!("migration_v{}_begin_tx", migration.version),
            cause: e.to_string(),
        })?;

        tx.execute_batch(migration.sql)
            .map_err(|e| Error::QueryFailed {
                operation: format!("migration_v{}: {}", migration.version, migration.description),
                cause: e.to_string(),
            })?;

        tx.execute(
            &format!("INSERT INTO {MIGRATIONS_TABLE} (version, description) VALUES (?1, ?2)"),
            params![migration.version, migration.description],
        )
        .map_err(|e| Error::QueryFailed {
            operation: "record_migration".to_string(),
            cause: e.to_string(),
        })?;

        tx.commit().map_err(|e| Error::QueryFailed {
            operation: format!("migration_v{}_commit", migration.version),
            cause: e.to_string(),
        })?;

        tracing::info!(
            version = migration.version,
            description = migration.description,
            "Applied migration"
        );

        Ok(())
    }
}

/// Maximum version across a set of migrations.
#[must_use]
pub const fn max_version(migrations: &[Migration]) -> i32 {
    let mut max = 0;
    let mut i = 0;
    while i < migrations.len() {
        if migrations[i].version > max {
            max = migrations[i].version;
        }
        i += 1;
    }
    max
}
