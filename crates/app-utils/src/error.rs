//! Error types for app-utils

use cert_policy::PolicyError;
use std::path::PathBuf;
use std::time::SystemTimeError;
use thiserror::Error;

/// Main error type of the `app-utils` crate
#[derive(Error, Debug)]
pub enum Error {
    /// System clock is before the Unix epoch
    #[error("System time error: {0}")]
    SystemTime(#[from] SystemTimeError),

    /// Policy document failed to parse or validate
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// YAML parsing failed
    #[error("YAML parsing failed: {0}")]
    YamlParseError(String),

    /// A file could not be read or inspected
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File extension names no known document format
    #[error("Unsupported document format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// A cache lock was poisoned by a panicking thread
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
