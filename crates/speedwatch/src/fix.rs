//! Location sample model.
//!
//! This module defines the fundamental data structure for a single reported
//! location fix, as delivered by a location source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One reported location fix.
///
/// A fix carries coordinates, an optional instantaneous sensor speed, and
/// the time the fix was taken. Fixes are immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    /// Latitude in degrees.
    pub latitude: f64,

    /// Longitude in degrees.
    pub longitude: f64,

    /// Instantaneous speed in meters per second, when the sensor measured
    /// one directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_mps: Option<f64>,

    /// When the fix was taken.
    pub timestamp: DateTime<Utc>,
}

impl Fix {
    /// Create a fix without a directly measured speed.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            speed_mps: None,
            timestamp,
        }
    }

    /// Attach a directly measured sensor speed in meters per second.
    #[must_use]
    pub fn with_speed(mut self, speed_mps: f64) -> Self {
        self.speed_mps = Some(speed_mps);
        self
    }

    /// Check that the coordinates are finite and within range.
    ///
    /// Sources are not trusted to deliver sane coordinates; callers reject
    /// invalid fixes before estimation.
    #[must_use]
    pub fn has_valid_coordinates(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Milliseconds elapsed since an earlier fix.
    ///
    /// Negative when this fix's timestamp regresses behind the earlier one.
    #[must_use]
    pub fn elapsed_ms_since(&self, earlier: &Fix) -> i64 {
        (self.timestamp - earlier.timestamp).num_milliseconds()
    }
}
