//! Recorded location trace format.
//!
//! A trace is a JSON Lines file: one entry per line, each either a location
//! fix or a scripted provider failure. Traces are the replay equivalent of a
//! live location sensor and let every provider behavior be reproduced from a
//! file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading a trace.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The trace file could not be read.
    #[error("failed to read trace file {path}: {source}")]
    Read {
        /// Path to the trace file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A line of the trace file is not a valid entry.
    #[error("invalid trace entry on line {line}: {source}")]
    Parse {
        /// 1-based line number of the offending entry.
        line: usize,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for trace operations.
pub type Result<T> = std::result::Result<T, TraceError>;

/// Classification of a recorded provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// The user denied access to the location sensor.
    PermissionDenied,
    /// The sensor could not produce a position.
    PositionUnavailable,
    /// The position request timed out.
    Timeout,
    /// Any other provider failure.
    Unknown,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "permission-denied"),
            Self::PositionUnavailable => write!(f, "position-unavailable"),
            Self::Timeout => write!(f, "timeout"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A recorded location fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixEntry {
    /// Latitude in degrees.
    pub latitude: f64,

    /// Longitude in degrees.
    pub longitude: f64,

    /// Instantaneous sensor speed in meters per second, when the sensor
    /// reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_mps: Option<f64>,

    /// Milliseconds since the Unix epoch when the fix was recorded.
    pub timestamp_ms: i64,
}

/// A recorded provider failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEntry {
    /// What kind of failure the provider reported.
    pub error: FailureKind,

    /// Milliseconds since the Unix epoch when the failure was recorded.
    pub timestamp_ms: i64,
}

/// One entry of a recorded trace.
///
/// Entries are distinguished by shape: a failure entry carries an `error`
/// field, a fix entry carries coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraceEntry {
    /// A scripted provider failure.
    Failure(FailureEntry),
    /// A location fix.
    Fix(FixEntry),
}

impl TraceEntry {
    /// The recorded timestamp of this entry in milliseconds since the epoch.
    #[must_use]
    pub fn timestamp_ms(&self) -> i64 {
        match self {
            Self::Failure(f) => f.timestamp_ms,
            Self::Fix(f) => f.timestamp_ms,
        }
    }
}

/// An ordered sequence of recorded entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    entries: Vec<TraceEntry>,
}

impl Trace {
    /// Create a trace from a list of entries.
    #[must_use]
    pub fn new(entries: Vec<TraceEntry>) -> Self {
        Self { entries }
    }

    /// Parse a trace from JSON Lines text.
    ///
    /// Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending line if any entry fails to
    /// parse.
    pub fn parse(input: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for (i, line) in input.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let entry =
                serde_json::from_str(line).map_err(|source| TraceError::Parse {
                    line: i + 1,
                    source,
                })?;
            entries.push(entry);
        }
        Ok(Self { entries })
    }

    /// Load a trace from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or any entry fails to
    /// parse.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| TraceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// The recorded entries, in order.
    #[must_use]
    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    /// Number of entries in the trace.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the trace has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
