//! Error types for speedwatch.
//!
//! This module defines all error types used throughout the speedwatch
//! crate. Provider failures ([`crate::source::PositionError`]) are not
//! errors in this sense: they are events the session renders as status
//! messages. Everything here is an operational failure.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for speedwatch operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Source Errors ===
    /// A location source failed to start.
    #[error("failed to start location source '{name}': {message}")]
    SourceStart {
        /// Name of the source.
        name: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    /// A location source failed to stop.
    #[error("failed to stop location source '{name}': {message}")]
    SourceStop {
        /// Name of the source.
        name: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    // === Trace Errors ===
    /// A trace file could not be read.
    #[error("failed to read trace file {path}: {source}")]
    TraceRead {
        /// Path to the trace file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A trace file contained an invalid entry.
    #[error("invalid trace entry on line {line}: {source}")]
    TraceParse {
        /// 1-based line number of the offending entry.
        line: usize,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for speedwatch operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<speedwatch_replay::TraceError> for Error {
    fn from(err: speedwatch_replay::TraceError) -> Self {
        match err {
            speedwatch_replay::TraceError::Read { path, source } => {
                Self::TraceRead { path, source }
            }
            speedwatch_replay::TraceError::Parse { line, source } => {
                Self::TraceParse { line, source }
            }
        }
    }
}

impl From<crate::limit::InvalidLimit> for Error {
    fn from(err: crate::limit::InvalidLimit) -> Self {
        Self::ConfigValidation {
            message: err.to_string(),
        }
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a source start error.
    #[must_use]
    pub fn source_start(name: &'static str, message: impl Into<String>) -> Self {
        Self::SourceStart {
            name,
            message: message.into(),
        }
    }

    /// Create a source stop error.
    #[must_use]
    pub fn source_stop(name: &'static str, message: impl Into<String>) -> Self {
        Self::SourceStop {
            name,
            message: message.into(),
        }
    }

    /// Check if this error is a configuration problem.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigLoad(_) | Self::ConfigValidation { .. })
    }
}
