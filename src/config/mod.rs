//! Configuration management.
//!
//! Settings come from a single JSON or TOML file picked by extension. The
//! first file found wins:
//!
//! 1. the path given on the command line,
//! 2. `<root>/web/config.json` (web front-end override),
//! 3. `<root>/config/config.json` (desktop file),
//! 4. `gonetwork/config.toml` or `gonetwork/config.json` in the per-user
//!    config directory.
//!
//! Anything missing falls back to the defaults below. `GONETWORK_DB_PATH`
//! overrides `database.path` after the file is read.

use crate::observability::LogFormat;
use crate::session::DEFAULT_TIMEOUT_SECS;
use crate::storage::cache::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL};
use crate::storage::{CacheSettings, DatabasePaths, InvalidationPolicy};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the database path.
pub const DB_PATH_ENV: &str = "GONETWORK_DB_PATH";

/// Directory name used under the per-user config dir.
const APP_DIR: &str = "gonetwork";

/// Result of [`AppConfig::load`].
#[derive(Debug)]
pub struct LoadedConfig {
    /// Effective configuration, before environment overrides.
    pub config: AppConfig,
    /// File the configuration came from, `None` for defaults.
    pub source: Option<PathBuf>,
    /// Discovered files that could not be read or parsed, in lookup order.
    pub skipped: Vec<SkippedConfig>,
}

/// A discovered config file passed over during lookup.
#[derive(Debug)]
pub struct SkippedConfig {
    /// Path of the file.
    pub path: PathBuf,
    /// Why it was skipped.
    pub error: Error,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Product name shown in headers.
    pub app_name: String,
    /// Product version string.
    pub version: String,
    /// Database location.
    pub database: DatabaseSettings,
    /// UI colors.
    pub theme: ThemeSettings,
    /// Session behavior.
    pub session: SessionSettings,
    /// Read cache tuning.
    pub cache: CacheConfig,
    /// Logging output.
    pub logging: LoggingSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "GoNetwork AI".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: DatabaseSettings::default(),
            theme: ThemeSettings::default(),
            session: SessionSettings::default(),
            cache: CacheConfig::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// `database` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Explicit database file. Relative paths are taken from the app root.
    pub path: Option<PathBuf>,
}

/// `theme` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeSettings {
    /// Main brand color.
    pub primary_color: String,
    /// Secondary color.
    pub secondary_color: String,
    /// Highlight color.
    pub accent_color: String,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            primary_color: "#1e3a8a".to_string(),
            secondary_color: "#64748b".to_string(),
            accent_color: "#f59e0b".to_string(),
        }
    }
}

/// `session` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Inactivity timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `cache` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry lifetime in seconds. Zero disables the cache.
    pub ttl_secs: u64,
    /// Maximum number of cached results.
    pub capacity: usize,
    /// What writes do to cached results.
    pub invalidation: InvalidationPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_CACHE_TTL.as_secs(),
            capacity: DEFAULT_CACHE_CAPACITY,
            invalidation: InvalidationPolicy::default(),
        }
    }
}

/// `logging` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `gonetwork=debug`.
    pub level: Option<String>,
    /// Output format.
    pub format: Option<LogFormat>,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl AppConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file. `.toml` files are parsed as TOML,
    /// everything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let parsed = if is_toml {
            toml::from_str(&contents).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&contents).map_err(|e| e.to_string())
        };

        parsed.map_err(|cause| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: format!("{}: {cause}", path.display()),
        })
    }

    /// Candidate files under `root`, in lookup order, excluding the
    /// per-user directory.
    #[must_use]
    pub fn candidates(root: &Path) -> [PathBuf; 2] {
        [
            root.join("web").join("config.json"),
            root.join("config").join("config.json"),
        ]
    }

    /// Candidate files in the per-user config directory.
    #[must_use]
    pub fn user_candidates() -> Vec<PathBuf> {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Vec::new();
        };
        let dir = base_dirs.config_dir().join(APP_DIR);
        vec![dir.join("config.toml"), dir.join("config.json")]
    }

    /// Returns the first existing config file for `root`.
    #[must_use]
    pub fn discover(root: &Path) -> Option<PathBuf> {
        Self::candidates(root)
            .into_iter()
            .chain(Self::user_candidates())
            .find(|p| p.is_file())
    }

    /// Loads the configuration for an application rooted at `root`.
    ///
    /// An explicit path must exist and parse. A discovered file that fails to
    /// parse is recorded in [`LoadedConfig::skipped`] and the next candidate
    /// is tried. Nothing is logged here since this runs before the
    /// subscriber is installed.
    ///
    /// # Errors
    ///
    /// Returns an error if `explicit` cannot be loaded.
    pub fn load(explicit: Option<&Path>, root: &Path) -> Result<LoadedConfig> {
        if let Some(path) = explicit {
            return Ok(LoadedConfig {
                config: Self::load_from_file(path)?,
                source: Some(path.to_path_buf()),
                skipped: Vec::new(),
            });
        }

        let mut skipped = Vec::new();
        let discovered = Self::candidates(root)
            .into_iter()
            .chain(Self::user_candidates())
            .filter(|p| p.is_file());
        for path in discovered {
            match Self::load_from_file(&path) {
                Ok(config) => {
                    return Ok(LoadedConfig {
                        config,
                        source: Some(path),
                        skipped,
                    });
                },
                Err(e) => skipped.push(SkippedConfig { path, error: e }),
            }
        }

        Ok(LoadedConfig {
            config: Self::default(),
            source: None,
            skipped,
        })
    }

    /// Applies environment overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies environment overrides using `lookup` to read variables.
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup(DB_PATH_ENV).filter(|v| !v.trim().is_empty()) {
            self.database.path = Some(PathBuf::from(path));
        }
        self
    }

    /// Database locations for an application rooted at `root`.
    #[must_use]
    pub fn database_paths(&self, root: &Path) -> DatabasePaths {
        let explicit = self.database.path.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                root.join(p)
            }
        });
        DatabasePaths::for_root(root).with_explicit(explicit)
    }

    /// Cache settings for [`crate::Database`].
    #[must_use]
    pub const fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            ttl: Duration::from_secs(self.cache.ttl_secs),
            capacity: self.cache.capacity,
            invalidation: self.cache.invalidation,
        }
    }

    /// Session inactivity timeout.
    #[must_use]
    pub const fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.app_name, "GoNetwork AI");
        assert_eq!(config.session.timeout_secs, 7200);
        assert_eq!(config.cache_settings(), CacheSettings::default());
        assert!(config.database.path.is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r##"{"app_name": "Go", "theme": {"primary_color": "#000"}, "cache": {"invalidation": "ttl_only"}}"##,
        )
        .unwrap();

        let config = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(config.app_name, "Go");
        assert_eq!(config.theme.primary_color, "#000");
        assert_eq!(config.theme.accent_color, ThemeSettings::default().accent_color);
        assert_eq!(config.cache.invalidation, InvalidationPolicy::TtlOnly);
        assert_eq!(config.cache.ttl_secs, 300);
    }

    #[test]
    fn test_toml_by_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gonetwork.toml");
        fs::write(
            &path,
            "version = \"2.0\"\n[session]\ntimeout_secs = 60\n[logging]\nformat = \"json\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(config.version, "2.0");
        assert_eq!(config.session_timeout(), Duration::from_secs(60));
        assert_eq!(config.logging.format, Some(LogFormat::Json));
    }

    #[test]
    fn test_web_override_wins() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("web")).unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::write(dir.path().join("web/config.json"), r#"{"app_name": "web"}"#).unwrap();
        fs::write(dir.path().join("config/config.json"), r#"{"app_name": "desktop"}"#).unwrap();

        let loaded = AppConfig::load(None, dir.path()).unwrap();
        assert_eq!(loaded.config.app_name, "web");
        assert_eq!(loaded.source, Some(dir.path().join("web/config.json")));
        assert!(loaded.skipped.is_empty());
    }

    #[test]
    fn test_broken_discovered_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("web")).unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::write(dir.path().join("web/config.json"), "{not json").unwrap();
        fs::write(dir.path().join("config/config.json"), r#"{"app_name": "desktop"}"#).unwrap();

        let loaded = AppConfig::load(None, dir.path()).unwrap();
        assert_eq!(loaded.config.app_name, "desktop");
        assert_eq!(loaded.source, Some(dir.path().join("config/config.json")));
        assert_eq!(loaded.skipped.len(), 1);
        assert_eq!(loaded.skipped[0].path, dir.path().join("web/config.json"));
        assert!(matches!(
            &loaded.skipped[0].error,
            Error::OperationFailed { operation, .. } if operation == "parse_config_file"
        ));
    }

    #[test]
    fn test_only_broken_file_falls_back_to_defaults_and_reports_it() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::write(dir.path().join("config/config.json"), "[1, 2").unwrap();

        let loaded = AppConfig::load(None, dir.path()).unwrap();
        assert_eq!(loaded.config.app_name, AppConfig::default().app_name);
        assert_eq!(loaded.source, None);
        assert_eq!(loaded.skipped.len(), 1);
        assert_eq!(loaded.skipped[0].path, dir.path().join("config/config.json"));
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.json");
        let err = AppConfig::load(Some(&missing), dir.path()).unwrap_err();
        assert!(matches!(err, Error::OperationFailed { .. }));
    }

    #[test]
    fn test_env_override_and_relative_path() {
        let config = AppConfig::default().with_overrides_from(|key| {
            (key == DB_PATH_ENV).then(|| "custom/app.db".to_string())
        });
        let root = Path::new("/srv/gonetwork");
        assert_eq!(
            config.database_paths(root).resolve(),
            root.join("custom/app.db")
        );

        let blank = AppConfig::default().with_overrides_from(|_| Some("  ".to_string()));
        assert!(blank.database.path.is_none());
    }
}
