//! Structured logging configuration.

use crate::config::LoggingSettings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter. Takes precedence over
/// `RUST_LOG`.
pub const LOG_ENV: &str = "GONETWORK_LOG";

const DEFAULT_LEVEL: &str = "warn";
const VERBOSE_LEVEL: &str = "gonetwork=debug,info";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name. Unknown names yield `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Resolved logging setup.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Event filter.
    pub filter: EnvFilter,
    /// Output format.
    pub format: LogFormat,
    /// Optional append-only log file.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Builds the logging setup from the config file section, the process
    /// environment and the `--verbose` flag.
    #[must_use]
    pub fn from_settings(settings: Option<&LoggingSettings>, verbose: bool) -> Self {
        Self::from_settings_with(settings, verbose, |key| std::env::var(key).ok())
    }

    /// Like [`LoggingConfig::from_settings`] reading variables through
    /// `lookup`.
    #[must_use]
    pub fn from_settings_with(
        settings: Option<&LoggingSettings>,
        verbose: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let directive = filter_directive(settings, verbose, &lookup);
        let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));
        Self {
            filter,
            format: settings.and_then(|s| s.format).unwrap_or_default(),
            file: settings.and_then(|s| s.file.clone()),
        }
    }
}

/// Picks the filter directive. The environment wins, then `--verbose`, then
/// the configured level.
fn filter_directive(
    settings: Option<&LoggingSettings>,
    verbose: bool,
    lookup: &impl Fn(&str) -> Option<String>,
) -> String {
    let from_env = [LOG_ENV, "RUST_LOG"]
        .into_iter()
        .find_map(|key| lookup(key).filter(|v| !v.trim().is_empty()));
    if let Some(directive) = from_env {
        return directive;
    }
    if verbose {
        return VERBOSE_LEVEL.to_string();
    }
    settings
        .and_then(|s| s.level.clone())
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
}
