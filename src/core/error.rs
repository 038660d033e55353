//! Error types for the linecov library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using linecov's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while ingesting a coverage report.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Coverage report file could not be opened or read.
    ///
    /// Carries the report path so a broken test-harness integration is
    /// diagnosable from the error alone.
    #[error("Failed to read coverage report {path}: {source}")]
    ReportRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed report content.
    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new parse error for the given report path.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}
