//! The database façade.
//!
//! [`Database`] is the single choke point for SQL against the application
//! file. Every call opens its own connection, runs, and closes it again; there
//! is no pool and no statement cache. Concurrent writers are serialized by
//! `SQLite` file locking only, so racing updates are last-writer-wins.

use super::cache::{CacheSettings, InvalidationPolicy, QueryCache};
use super::connection::{OpenMode, classify_error, open_connection};
use super::migrations::MigrationRunner;
use super::record::{FromRecord, Record};
use super::schema::MIGRATIONS;
use super::value::SqlValue;
use crate::Result;
use regex::Regex;
use rusqlite::{Connection, params_from_iter};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use std::time::Instant;
use tracing::instrument;

/// Leading verb and target table of a data-modifying statement.
static WRITE_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)^\s*(?:insert(?:\s+or\s+\w+)?\s+into|replace\s+into|update(?:\s+or\s+\w+)?|delete\s+from)\s+["`\[]?([a-z_][a-z0-9_]*)"#,
    )
    .unwrap_or_else(|_| unreachable!())
});

/// Returns the table a write statement targets, if it can be determined.
#[must_use]
pub fn write_target(query: &str) -> Option<String> {
    WRITE_TARGET
        .captures(query)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
}

/// One statement of a [`Database::write_batch`].
#[derive(Debug, Clone)]
pub struct Statement<'a> {
    /// SQL text with positional placeholders.
    pub sql: &'a str,
    /// Bound parameters.
    pub params: Vec<SqlValue>,
}

impl<'a> Statement<'a> {
    /// Creates a statement.
    #[must_use]
    pub fn new(sql: &'a str, params: impl IntoIterator<Item = SqlValue>) -> Self {
        Self {
            sql,
            params: params.into_iter().collect(),
        }
    }
}

/// Column metadata returned by [`Database::list_columns`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Declared type (may be empty).
    pub declared_type: String,
    /// Whether the column is `NOT NULL`.
    pub not_null: bool,
    /// Whether the column is part of the primary key.
    pub primary_key: bool,
}

impl FromRecord for ColumnInfo {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            name: record.text("name")?,
            declared_type: record.opt_text("type")?.unwrap_or_default(),
            not_null: record.boolean("notnull")?,
            primary_key: record.integer("pk")? > 0,
        })
    }
}

/// Façade over one `SQLite` database file.
pub struct Database {
    path: PathBuf,
    cache: QueryCache,
    invalidation: InvalidationPolicy,
}

impl Database {
    /// Creates a façade for `path` without touching the filesystem.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, settings: CacheSettings) -> Self {
        Self {
            path: path.into(),
            cache: QueryCache::new(settings.capacity, settings.ttl),
            invalidation: settings.invalidation,
        }
    }

    /// Opens `path` with default cache settings, creating the file and
    /// applying pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or a migration fails.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with(path, CacheSettings::default())
    }

    /// Like [`Database::open`] with explicit cache settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or a migration fails.
    pub fn open_with(path: impl Into<PathBuf>, settings: CacheSettings) -> Result<Self> {
        let db = Self::new(path, settings);
        db.migrate()?;
        Ok(db)
    }

    /// Database file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The read cache.
    #[must_use]
    pub const fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// The active write invalidation policy.
    #[must_use]
    pub const fn invalidation(&self) -> InvalidationPolicy {
        self.invalidation
    }

    /// Applies pending schema migrations, returning how many ran.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or a migration fails.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn migrate(&self) -> Result<usize> {
        let mut conn = open_connection(&self.path, OpenMode::Create)?;
        let applied = MigrationRunner::new(&mut conn).run(MIGRATIONS)?;
        if applied > 0 {
            self.cache.invalidate_all();
        }
        Ok(applied)
    }

    /// Returns the applied schema version (0 for an empty file).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn schema_version(&self) -> Result<i32> {
        let mut conn = open_connection(&self.path, OpenMode::Existing)?;
        MigrationRunner::new(&mut conn).current_version()
    }

    /// Runs a read query, serving identical `(query, params)` from the cache
    /// while the entry is live.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ConnectionFailed`] if the file is missing or not
    /// a database, [`crate::Error::QueryFailed`] for bad SQL.
    #[instrument(skip(self, params), fields(param_count = params.len()))]
    pub fn read(&self, query: &str, params: &[SqlValue]) -> Result<Vec<Record>> {
        let key = QueryCache::key(query, params);
        if let Some(rows) = self.cache.get(&key) {
            tracing::trace!(rows = rows.len(), "Served from query cache");
            return Ok(rows.as_ref().clone());
        }

        let rows = Arc::new(self.read_uncached(query, params)?);
        self.cache.insert(key, query, Arc::clone(&rows));
        Ok(Arc::unwrap_or_clone(rows))
    }

    /// Runs a read query against the file, bypassing the cache.
    ///
    /// Used for referential pre-checks that must see committed state.
    ///
    /// # Errors
    ///
    /// Same as [`Database::read`].
    pub fn read_uncached(&self, query: &str, params: &[SqlValue]) -> Result<Vec<Record>> {
        let start = Instant::now();
        let conn = open_connection(&self.path, OpenMode::Existing)?;
        let rows = self.collect_rows(&conn, query, params)?;

        metrics::counter!("gonetwork_queries_total", "kind" => "read").increment(1);
        metrics::histogram!("gonetwork_query_duration_ms", "kind" => "read")
            .record(start.elapsed().as_secs_f64() * 1000.0);
        tracing::debug!(
            rows = rows.len(),
            duration_ms = start.elapsed().as_millis(),
            "Read query executed"
        );
        Ok(rows)
    }

    fn collect_rows(&self, conn: &Connection, query: &str, params: &[SqlValue]) -> Result<Vec<Record>> {
        let fail = |e: rusqlite::Error| classify_error(&self.path, "read", &e);

        let mut stmt = conn.prepare(query).map_err(fail)?;
        let columns: Arc<[String]> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = stmt.query(params_from_iter(params.iter())).map_err(fail)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(fail)? {
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                values.push(SqlValue::from(row.get_ref(idx).map_err(fail)?));
            }
            out.push(Record::new(Arc::clone(&columns), values));
        }
        Ok(out)
    }

    /// Runs a read query and maps every row through [`FromRecord`].
    ///
    /// # Errors
    ///
    /// Same as [`Database::read`], plus [`crate::Error::InvalidRecord`].
    pub fn read_as<T: FromRecord>(&self, query: &str, params: &[SqlValue]) -> Result<Vec<T>> {
        self.read(query, params)?.iter().map(T::from_record).collect()
    }

    /// Runs a read query and maps the first row, if any.
    ///
    /// # Errors
    ///
    /// Same as [`Database::read_as`].
    pub fn read_one_as<T: FromRecord>(&self, query: &str, params: &[SqlValue]) -> Result<Option<T>> {
        self.read(query, params)?.first().map(T::from_record).transpose()
    }

    /// Returns the first column of the first row as an integer, bypassing the
    /// cache. Empty results and `NULL` read as 0.
    ///
    /// # Errors
    ///
    /// Same as [`Database::read_uncached`].
    pub fn count(&self, query: &str, params: &[SqlValue]) -> Result<i64> {
        let rows = self.read_uncached(query, params)?;
        Ok(rows
            .first()
            .and_then(|r| r.iter().next().and_then(|(_, v)| v.as_i64()))
            .unwrap_or(0))
    }

    /// Executes one data-modifying statement in its own transaction.
    ///
    /// Returns whether any row was affected. On failure the transaction is
    /// rolled back and the error classified.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ConstraintViolated`] for constraint failures,
    /// [`crate::Error::ConnectionFailed`] if the file cannot be opened, and
    /// [`crate::Error::QueryFailed`] otherwise.
    #[instrument(skip(self, params), fields(param_count = params.len()))]
    pub fn write(&self, query: &str, params: &[SqlValue]) -> Result<bool> {
        let affected = self.execute_all(&[Statement::new(query, params.iter().cloned())])?;
        Ok(affected > 0)
    }

    /// Executes several statements atomically, returning the total number of
    /// affected rows.
    ///
    /// # Errors
    ///
    /// Same as [`Database::write`]; no statement is committed on failure.
    #[instrument(skip(self, statements), fields(statement_count = statements.len()))]
    pub fn write_batch(&self, statements: &[Statement<'_>]) -> Result<usize> {
        self.execute_all(statements)
    }

    fn execute_all(&self, statements: &[Statement<'_>]) -> Result<usize> {
        let start = Instant::now();
        let fail = |e: rusqlite::Error| classify_error(&self.path, "write", &e);

        let mut conn = open_connection(&self.path, OpenMode::Create)?;
        let tx = conn.transaction().map_err(fail)?;
        let mut affected = 0;
        for statement in statements {
            affected += tx
                .execute(statement.sql, params_from_iter(statement.params.iter()))
                .map_err(|e| {
                    tracing::warn!(error = %e, "Write failed, rolling back");
                    fail(e)
                })?;
        }
        tx.commit().map_err(fail)?;

        self.after_write(statements);

        metrics::counter!("gonetwork_queries_total", "kind" => "write").increment(1);
        metrics::histogram!("gonetwork_query_duration_ms", "kind" => "write")
            .record(start.elapsed().as_secs_f64() * 1000.0);
        tracing::debug!(
            affected,
            duration_ms = start.elapsed().as_millis(),
            "Write committed"
        );
        Ok(affected)
    }

    fn after_write(&self, statements: &[Statement<'_>]) {
        if self.invalidation == InvalidationPolicy::TtlOnly {
            return;
        }
        for statement in statements {
            match write_target(statement.sql) {
                Some(table) => {
                    self.cache.invalidate_table(&table);
                },
                None => {
                    self.cache.invalidate_all();
                    return;
                },
            }
        }
    }

    /// Drops cached results for `tables` after changes the write path cannot
    /// see, such as `ON DELETE CASCADE`. A no-op under
    /// [`InvalidationPolicy::TtlOnly`].
    pub fn invalidate_tables(&self, tables: &[&str]) {
        if self.invalidation == InvalidationPolicy::TtlOnly {
            return;
        }
        for table in tables {
            self.cache.invalidate_table(table);
        }
    }

    /// Lists user tables, cached like [`Database::read`].
    ///
    /// # Errors
    ///
    /// Same as [`Database::read`].
    pub fn list_tables(&self) -> Result<Vec<String>> {
        self.read(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            &[],
        )?
        .iter()
        .map(|r| r.text("name"))
        .collect()
    }

    /// Lists the columns of `table`, cached like [`Database::read`]. Unknown
    /// tables yield an empty list.
    ///
    /// # Errors
    ///
    /// Same as [`Database::read`].
    pub fn list_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        self.read_as(
            "SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1) ORDER BY cid",
            &[SqlValue::from(table)],
        )
    }

    /// Lossy read: logs the error and returns an empty list instead.
    #[must_use]
    pub fn read_or_empty(&self, query: &str, params: &[SqlValue]) -> Vec<Record> {
        self.read(query, params).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Read failed, returning no rows");
            Vec::new()
        })
    }

    /// Lossy write: logs the error and returns `false` instead.
    #[must_use]
    pub fn write_or_false(&self, query: &str, params: &[SqlValue]) -> bool {
        self.write(query, params).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Write failed");
            false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::sql_params;
    use std::time::Duration;
    use tempfile::TempDir;

    fn open_db(dir: &TempDir, settings: CacheSettings) -> Database {
        let db = Database::open_with(dir.path().join("data").join("test.db"), settings).unwrap();
        db.write(
            "CREATE TABLE IF NOT EXISTS kv (k TEXT PRIMARY KEY, v INTEGER NOT NULL)",
            &[],
        )
        .unwrap();
        db
    }

    #[test]
    fn test_write_target() {
        assert_eq!(write_target("INSERT INTO events (id) VALUES (?1)").as_deref(), Some("events"));
        assert_eq!(write_target("  insert or replace into \"clients\" VALUES (1)").as_deref(), Some("clients"));
        assert_eq!(write_target("UPDATE deliverables SET progress = 1").as_deref(), Some("deliverables"));
        assert_eq!(write_target("delete from Comments where id = ?1").as_deref(), Some("comments"));
        assert_eq!(write_target("CREATE TABLE x (id)"), None);
    }

    #[test]
    fn test_read_maps_columns_in_order() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir, CacheSettings::default());
        assert!(db.write("INSERT INTO kv (k, v) VALUES (?1, ?2)", &sql_params!["a", 1_i64]).unwrap());

        let rows = db.read("SELECT v, k FROM kv", &[]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].columns(), ["v", "k"]);
        assert_eq!(rows[0].get("k"), Some(&SqlValue::from("a")));
    }

    #[test]
    fn test_write_reports_affected_rows() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir, CacheSettings::default());
        assert!(!db.write("UPDATE kv SET v = 2 WHERE k = ?1", &sql_params!["nope"]).unwrap());
    }

    #[test]
    fn test_constraint_violation_is_typed() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir, CacheSettings::default());
        db.write("INSERT INTO kv (k, v) VALUES ('a', 1)", &[]).unwrap();
        let err = db.write("INSERT INTO kv (k, v) VALUES ('a', 2)", &[]).unwrap_err();
        assert!(matches!(err, Error::ConstraintViolated { .. }));
        assert!(!db.write_or_false("INSERT INTO kv (k, v) VALUES ('a', 3)", &[]));
    }

    #[test]
    fn test_bad_sql_is_query_failed() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir, CacheSettings::default());
        let err = db.read("SELECT * FROM missing_table", &[]).unwrap_err();
        assert!(matches!(err, Error::QueryFailed { .. }));
        assert!(db.read_or_empty("SELECT * FROM missing_table", &[]).is_empty());
    }

    #[test]
    fn test_read_on_missing_file_is_connection_failed() {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path().join("absent.db"), CacheSettings::default());
        let err = db.read("SELECT 1", &[]).unwrap_err();
        assert!(matches!(err, Error::ConnectionFailed { .. }));
        assert!(!dir.path().join("absent.db").exists());
    }

    #[test]
    fn test_batch_is_atomic() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir, CacheSettings::default());
        let result = db.write_batch(&[
            Statement::new("INSERT INTO kv (k, v) VALUES ('x', 1)", []),
            Statement::new("INSERT INTO kv (k, v) VALUES ('x', 2)", []),
        ]);
        assert!(result.is_err());
        assert_eq!(db.count("SELECT COUNT(*) FROM kv", &[]).unwrap(), 0);
    }

    #[test]
    fn test_ttl_only_policy_serves_stale_rows() {
        let dir = TempDir::new().unwrap();
        let settings = CacheSettings {
            invalidation: InvalidationPolicy::TtlOnly,
            ..CacheSettings::default()
        };
        let db = open_db(&dir, settings);
        db.write("INSERT INTO kv (k, v) VALUES ('a', 1)", &[]).unwrap();

        let before = db.read("SELECT v FROM kv WHERE k = ?1", &sql_params!["a"]).unwrap();
        db.write("UPDATE kv SET v = 2 WHERE k = 'a'", &[]).unwrap();
        let after = db.read("SELECT v FROM kv WHERE k = ?1", &sql_params!["a"]).unwrap();

        assert_eq!(after, before);
        assert_eq!(after[0].integer("v").unwrap(), 1);
    }

    #[test]
    fn test_on_write_policy_invalidates() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir, CacheSettings::default());
        db.write("INSERT INTO kv (k, v) VALUES ('a', 1)", &[]).unwrap();

        db.read("SELECT v FROM kv WHERE k = ?1", &sql_params!["a"]).unwrap();
        db.write("UPDATE kv SET v = 2 WHERE k = 'a'", &[]).unwrap();
        let after = db.read("SELECT v FROM kv WHERE k = ?1", &sql_params!["a"]).unwrap();
        assert_eq!(after[0].integer("v").unwrap(), 2);
    }

    #[test]
    fn test_stale_rows_expire_with_ttl() {
        let dir = TempDir::new().unwrap();
        let settings = CacheSettings {
            ttl: Duration::from_millis(50),
            invalidation: InvalidationPolicy::TtlOnly,
            ..CacheSettings::default()
        };
        let db = open_db(&dir, settings);
        db.write("INSERT INTO kv (k, v) VALUES ('a', 1)", &[]).unwrap();
        db.read("SELECT v FROM kv", &[]).unwrap();
        db.write("UPDATE kv SET v = 5", &[]).unwrap();

        std::thread::sleep(Duration::from_millis(80));
        let rows = db.read("SELECT v FROM kv", &[]).unwrap();
        assert_eq!(rows[0].integer("v").unwrap(), 5);
    }

    #[test]
    fn test_introspection() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir, CacheSettings::default());
        let tables = db.list_tables().unwrap();
        assert!(tables.contains(&"kv".to_string()));
        assert!(tables.contains(&"events".to_string()));

        let columns = db.list_columns("kv").unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "k");
        assert!(columns[0].primary_key);
        assert!(columns[1].not_null);
        assert!(db.list_columns("nope").unwrap().is_empty());
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir, CacheSettings::default());
        assert_eq!(db.migrate().unwrap(), 0);
        assert_eq!(db.schema_version().unwrap(), 2);
    }
}
