//! Speed limit policy.
//!
//! The limit is a caller-side concern: the estimator produces readings, and
//! the session compares them against the active limit to decide whether to
//! raise a warning. Comparison happens on the numeric value, never on
//! formatted text.

use thiserror::Error;

use crate::estimator::SpeedReading;

/// The default speed limit in km/h.
pub const DEFAULT_LIMIT_KMH: f64 = 40.0;

/// A proposed speed limit was not a positive number.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid speed limit {value}: must be a positive number")]
pub struct InvalidLimit {
    /// The rejected value.
    pub value: f64,
}

/// The active speed limit in km/h.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedLimit {
    kmh: f64,
}

impl Default for SpeedLimit {
    fn default() -> Self {
        Self {
            kmh: DEFAULT_LIMIT_KMH,
        }
    }
}

impl SpeedLimit {
    /// Create a limit from a km/h value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not positive and finite.
    pub fn new(kmh: f64) -> Result<Self, InvalidLimit> {
        let mut limit = Self::default();
        limit.set(kmh)?;
        Ok(limit)
    }

    /// The limit in km/h.
    #[must_use]
    pub fn kmh(&self) -> f64 {
        self.kmh
    }

    /// Replace the limit with a new value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not positive and finite; the
    /// current limit is left unchanged.
    pub fn set(&mut self, kmh: f64) -> Result<(), InvalidLimit> {
        if !kmh.is_finite() || kmh <= 0.0 {
            return Err(InvalidLimit { value: kmh });
        }
        self.kmh = kmh;
        Ok(())
    }

    /// Restore the default limit of 40 km/h.
    pub fn reset(&mut self) {
        self.kmh = DEFAULT_LIMIT_KMH;
    }

    /// Check whether a reading exceeds the limit.
    ///
    /// An unavailable reading never exceeds the limit.
    #[must_use]
    pub fn is_exceeded_by(&self, reading: &SpeedReading) -> bool {
        match reading {
            SpeedReading::Kmh(v) => *v > self.kmh,
            SpeedReading::Unavailable => false,
        }
    }
}
