//! Tracing subscriber set-up
//!
//! The interactive dashboard owns the terminal, so its logs go to a file.
//! One-shot runs log to stderr, leaving stdout for the report.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use thiserror::Error;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "riverwatch=info";

/// File name of the log inside the cache directory
pub const LOG_FILE_NAME: &str = "riverwatch.log";

/// Errors raised while setting up logging
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to open log file {path}: {source}")]
    OpenLogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("A global tracing subscriber is already installed")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Where log lines are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// Returns the platform cache location of the log file
///
/// Returns `None` if no home directory can be determined.
pub fn default_log_path() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "riverwatch")?;
    Some(project_dirs.cache_dir().join(LOG_FILE_NAME))
}

/// Opens a log file for appending, creating parent directories as needed
pub fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    let open = || -> io::Result<File> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(path)
    };

    open().map_err(|source| LoggingError::OpenLogFile {
        path: path.to_path_buf(),
        source,
    })
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn make_writer(target: &LogTarget) -> Result<BoxMakeWriter, LoggingError> {
    match target {
        LogTarget::Stderr => Ok(BoxMakeWriter::new(io::stderr)),
        LogTarget::File(path) => Ok(BoxMakeWriter::new(Mutex::new(open_log_file(path)?))),
    }
}

/// Installs the global subscriber
///
/// Fails if the log file cannot be opened or a subscriber already exists.
pub fn init(target: &LogTarget) -> Result<(), LoggingError> {
    let writer = make_writer(target)?;

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()?;

    Ok(())
}
