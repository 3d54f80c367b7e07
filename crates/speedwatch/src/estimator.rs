//! Speed estimation over a stream of location fixes.
//!
//! Each incoming fix yields a speed reading in km/h: the sensor's own speed
//! when it measured one, a distance-over-time derivation against the
//! previous fix otherwise, or "unavailable" when neither is possible. The
//! estimation itself is a pure function over the fix and the prior state so
//! it can be tested with scripted samples and no live sensor.

use crate::fix::Fix;
use crate::geodesy;

/// Conversion factor from meters per second to kilometers per hour.
pub const MPS_TO_KMH: f64 = 3.6;

/// A derived speed value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedReading {
    /// Speed in kilometers per hour, rounded to two decimal places.
    Kmh(f64),

    /// No speed could be derived from the available data.
    Unavailable,
}

impl SpeedReading {
    /// Check whether a speed value is present.
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Kmh(_))
    }

    /// The speed in km/h, if one was derived.
    #[must_use]
    pub fn kmh(&self) -> Option<f64> {
        match self {
            Self::Kmh(v) => Some(*v),
            Self::Unavailable => None,
        }
    }
}

impl std::fmt::Display for SpeedReading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kmh(v) => write!(f, "{v:.2}"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// State carried between estimations.
///
/// Holds the most recently processed fix; every processed fix becomes the
/// new `last_fix`, whether or not a speed could be derived from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstimatorState {
    /// The most recently processed fix.
    pub last_fix: Option<Fix>,
}

/// Round to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Derive a speed reading for `fix` given the prior state.
///
/// Pure function: returns the reading together with the successor state.
/// Preference order:
///
/// 1. A non-negative sensor speed is converted directly (m/s to km/h).
/// 2. Otherwise, with a previous fix and positive elapsed time, speed is
///    haversine distance over elapsed seconds.
/// 3. Otherwise the reading is [`SpeedReading::Unavailable`]. This covers
///    the first fix of a stream, duplicate or regressing timestamps, and a
///    malformed (negative) sensor speed.
#[must_use]
pub fn estimate(fix: &Fix, state: EstimatorState) -> (SpeedReading, EstimatorState) {
    let reading = match fix.speed_mps {
        Some(mps) if mps >= 0.0 => SpeedReading::Kmh(round2(mps * MPS_TO_KMH)),
        Some(_) => SpeedReading::Unavailable,
        None => match &state.last_fix {
            Some(prev) => {
                let elapsed_ms = fix.elapsed_ms_since(prev);
                if elapsed_ms > 0 {
                    let meters = geodesy::haversine(
                        prev.latitude,
                        prev.longitude,
                        fix.latitude,
                        fix.longitude,
                    );
                    let seconds = elapsed_ms as f64 / 1000.0;
                    SpeedReading::Kmh(round2(meters / seconds * MPS_TO_KMH))
                } else {
                    SpeedReading::Unavailable
                }
            }
            None => SpeedReading::Unavailable,
        },
    };

    let next = EstimatorState {
        last_fix: Some(fix.clone()),
    };
    (reading, next)
}

/// Stateful wrapper around [`estimate`] for use in an event loop.
#[derive(Debug, Default)]
pub struct SpeedEstimator {
    state: EstimatorState,
}

impl SpeedEstimator {
    /// Create an estimator with no prior fix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one fix and return its speed reading.
    pub fn update(&mut self, fix: &Fix) -> SpeedReading {
        let (reading, next) = estimate(fix, std::mem::take(&mut self.state));
        self.state = next;
        reading
    }

    /// The most recently processed fix, if any.
    #[must_use]
    pub fn last_fix(&self) -> Option<&Fix> {
        self.state.last_fix.as_ref()
    }
}
