//! `speedwatch` - a GPS speed monitor
//!
//! This library consumes a stream of device location samples, derives a
//! speed estimate for each one (directly measured sensor speed when
//! available, haversine distance over time otherwise), and raises a warning
//! on a display surface whenever the estimate exceeds a configurable limit.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod estimator;
pub mod fix;
pub mod geodesy;
pub mod limit;
pub mod logging;
pub mod replay;
pub mod session;
pub mod source;

pub use config::Config;
pub use display::{ConsoleDisplay, DisplaySurface};
pub use error::{Error, Result};
pub use estimator::{estimate, EstimatorState, SpeedEstimator, SpeedReading};
pub use fix::Fix;
pub use limit::{SpeedLimit, DEFAULT_LIMIT_KMH};
pub use logging::init_logging;
pub use replay::{ReplayLocationSource, ReplaySourceHandle};
pub use session::WatchSession;
pub use source::{LocationSource, PositionError, WatchEvent, WatchOptions};
