//! Command handlers module.
//!
//! - `database.rs`: init, doctor and table introspection
//! - `config.rs`: configuration display
//! - `listing.rs`: event and deliverable listings

mod config;
mod database;
mod listing;

pub use config::cmd_config;
pub use database::{cmd_doctor, cmd_init, cmd_tables};
pub use listing::{cmd_deliverables, cmd_events};

use anyhow::Context;
use gonetwork::config::{AppConfig, SkippedConfig};
use gonetwork::storage::DatabasePaths;
use gonetwork::Database;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything a command needs: the app root and the loaded configuration.
pub struct AppContext {
    root: PathBuf,
    config: AppConfig,
    source: Option<PathBuf>,
    skipped: Vec<SkippedConfig>,
}

impl AppContext {
    pub const fn new(
        root: PathBuf,
        config: AppConfig,
        source: Option<PathBuf>,
        skipped: Vec<SkippedConfig>,
    ) -> Self {
        Self {
            root,
            config,
            source,
            skipped,
        }
    }

    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// File the configuration was read from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Discovered config files that failed to load.
    pub fn skipped(&self) -> &[SkippedConfig] {
        &self.skipped
    }

    pub fn paths(&self) -> DatabasePaths {
        self.config.database_paths(&self.root)
    }

    /// Handle on the resolved database without touching the file.
    pub fn database(&self) -> Database {
        Database::new(self.paths().resolve(), self.config.cache_settings())
    }

    /// Opens the resolved database, which must already exist.
    pub fn existing_database(&self) -> anyhow::Result<Arc<Database>> {
        let db = self.database();
        if !db.path().is_file() {
            anyhow::bail!(
                "no database at {} (run `gonetwork init` first)",
                db.path().display()
            );
        }
        Ok(Arc::new(db))
    }

    /// Creates or migrates the resolved database.
    pub fn open_database(&self) -> anyhow::Result<Arc<Database>> {
        let path = self.paths().resolve();
        let db = Database::open_with(&path, self.config.cache_settings())
            .with_context(|| format!("opening {}", path.display()))?;
        Ok(Arc::new(db))
    }
}
