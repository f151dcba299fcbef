//! Logging setup.
//!
//! Library code only emits `tracing` events and `metrics` counters. The binary
//! calls [`init_from_config`] once to install a subscriber; no metrics
//! exporter is installed, so counters are no-ops unless an embedding
//! application registers a recorder.

mod logging;

pub use logging::{LOG_ENV, LogFormat, LoggingConfig};

use crate::config::LoggingSettings;
use crate::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

static OBSERVABILITY_INIT: OnceLock<()> = OnceLock::new();

/// Installs logging from the config file section and CLI flag, with
/// environment overrides.
///
/// # Errors
///
/// Returns an error if logging was already initialized or the log file
/// cannot be opened.
pub fn init_from_config(settings: &LoggingSettings, verbose: bool) -> Result<()> {
    init(LoggingConfig::from_settings(Some(settings), verbose))
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns an error if logging was already initialized or the log file
/// cannot be opened.
pub fn init(config: LoggingConfig) -> Result<()> {
    if OBSERVABILITY_INIT.get().is_some() {
        return Err(already_initialized());
    }

    let output = output_layer(config.format, config.file.as_deref())?;
    tracing_subscriber::registry()
        .with(output)
        .with(config.filter)
        .try_init()
        .map_err(|e| Error::OperationFailed {
            operation: "observability_init".to_string(),
            cause: e.to_string(),
        })?;

    OBSERVABILITY_INIT.set(()).map_err(|()| already_initialized())
}

/// Formatting layer for `format`, writing to `file` or stderr.
///
/// Files get no ANSI colors.
fn output_layer(format: LogFormat, file: Option<&Path>) -> Result<BoxedLayer> {
    let (writer, ansi) = match file {
        Some(path) => (BoxMakeWriter::new(Arc::new(open_log_file(path)?)), false),
        None => (BoxMakeWriter::new(io::stderr), true),
    };
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_target(true);

    Ok(match format {
        LogFormat::Json => layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
        LogFormat::Pretty => layer.with_ansi(ansi).boxed(),
    })
}

/// Opens `path` for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
            operation: "create_log_dir".to_string(),
            cause: format!("{}: {e}", parent.display()),
        })?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::OperationFailed {
            operation: "open_log_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })
}

fn already_initialized() -> Error {
    Error::OperationFailed {
        operation: "observability_init".to_string(),
        cause: "logging already initialized".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_log_file_is_appended() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("gonetwork.log");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "first\n").unwrap();

        let mut file = open_log_file(&path).unwrap();
        file.write_all(b"second\n").unwrap();
        file.flush().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }

    #[test]
    fn test_log_dir_is_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("app.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_json_layer_writes_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("app.json");
        let layer = output_layer(LogFormat::Json, Some(&path)).unwrap();
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(table = "events", "Cache cleared");
        });

        let contents = std::fs::read_to_string(&path).unwrap();
        let line: serde_json::Value = serde_json::from_str(contents.trim()).unwrap();
        assert_eq!(line["level"], "WARN");
        assert_eq!(line["fields"]["message"], "Cache cleared");
        assert_eq!(line["fields"]["table"], "events");
    }

    #[test]
    fn test_pretty_layer_to_file_has_no_colors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let layer = output_layer(LogFormat::Pretty, Some(&path)).unwrap();
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("Session timed out");
        });

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Session timed out"));
        assert!(!contents.contains('\u{1b}'));
    }

    #[test]
    fn test_unwritable_log_path_is_reported() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("taken");
        std::fs::write(&blocker, "").unwrap();
        let Err(err) = output_layer(LogFormat::Pretty, Some(&blocker.join("app.log"))) else {
            panic!("expected output_layer to fail for an unwritable log path");
        };
        assert!(
            matches!(&err, Error::OperationFailed { operation, .. } if operation == "create_log_dir"),
            "got {err:?}"
        );
    }
}
