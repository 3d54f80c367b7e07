//! Location source abstraction.
//!
//! This module defines the subscription interface a location provider must
//! fulfill: deliver fixes and failures over a channel until the trace or
//! sensor runs dry or the subscription is cancelled.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::fix::Fix;

/// Errors that can occur when operating a location source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source failed to start delivering samples.
    #[error("failed to start location source: {0}")]
    StartFailed(String),

    /// The source failed to stop cleanly.
    #[error("failed to stop location source: {0}")]
    StopFailed(String),

    /// The source is already delivering samples.
    #[error("location source already watching")]
    AlreadyWatching,

    /// The source is not delivering samples.
    #[error("location source not watching")]
    NotWatching,
}

/// Result type for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;

/// A failure reported by the location provider.
///
/// These are provider-side conditions; the estimator never sees them. Each
/// maps to a distinct user-facing status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum PositionError {
    /// The user denied access to the location sensor.
    #[error("permission to access location was denied")]
    PermissionDenied,

    /// The sensor could not produce a position.
    #[error("location is unavailable")]
    PositionUnavailable,

    /// No position arrived within the configured timeout.
    #[error("location request timed out")]
    Timeout,

    /// Any other provider failure.
    #[error("unknown error while obtaining location")]
    Unknown,
}

impl PositionError {
    /// The user-facing status message for this failure.
    #[must_use]
    pub fn status_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "Permission to access location was denied.",
            Self::PositionUnavailable => "Location is unavailable.",
            Self::Timeout => {
                "Location request timed out. Try again in an area with better signal."
            }
            Self::Unknown => "Unknown error while obtaining location.",
        }
    }

    /// Whether the hint panel should accompany the status message.
    ///
    /// Unknown failures carry no actionable hint.
    #[must_use]
    pub fn shows_hints(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// One event delivered by a location source.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    /// A location fix.
    Position(Fix),

    /// A provider failure.
    Failure(PositionError),
}

/// Configuration options recognized by location sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOptions {
    /// Ask the provider for its most accurate positioning mode.
    pub high_accuracy: bool,

    /// Maximum acceptable age of a delivered fix. Zero accepts every fix.
    pub max_sample_age: Duration,

    /// How long to wait for a fix before reporting a timeout failure.
    pub timeout: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            max_sample_age: Duration::ZERO,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Status of a location source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStatus {
    /// Whether the source is currently delivering samples.
    pub is_watching: bool,

    /// Whether the source has permission to read the location sensor.
    pub has_permission: bool,

    /// Number of fixes delivered since the subscription started.
    pub sample_count: u64,

    /// Human-readable status message.
    pub message: String,
}

impl SourceStatus {
    /// Status for an idle source.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            is_watching: false,
            has_permission: true,
            sample_count: 0,
            message: "Not watching".to_string(),
        }
    }

    /// Status for a source that is delivering samples.
    #[must_use]
    pub fn watching(sample_count: u64) -> Self {
        Self {
            is_watching: true,
            has_permission: true,
            sample_count,
            message: "Watching for location updates".to_string(),
        }
    }
}

/// A subscription-style provider of location samples.
///
/// Implementors deliver [`WatchEvent`]s through the channel passed to
/// `start` until they run out of samples, the receiver is dropped, or
/// `stop` is called.
#[async_trait::async_trait]
pub trait LocationSource: Send + Sync {
    /// The name of this source (for logging and error messages).
    fn name(&self) -> &'static str;

    /// Whether this source can deliver samples at all.
    fn is_available(&self) -> bool;

    /// Whether the source has permission to read the location sensor.
    fn has_permission(&self) -> bool;

    /// Whether the source is currently delivering samples.
    fn is_watching(&self) -> bool;

    /// The current status of the source.
    fn status(&self) -> SourceStatus;

    /// Start delivering events through `tx`, honoring `options`.
    ///
    /// Returns once delivery ends.
    ///
    /// # Errors
    ///
    /// Returns an error if the source fails to start.
    async fn start(&mut self, tx: mpsc::Sender<WatchEvent>, options: &WatchOptions)
        -> Result<()>;

    /// Stop delivering events.
    ///
    /// # Errors
    ///
    /// Returns an error if the source fails to stop cleanly.
    fn stop(&self) -> Result<()>;
}
