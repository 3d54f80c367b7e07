//! Recorded location traces for speedwatch.
//!
//! This crate provides the trace file format and playback machinery that
//! stand in for a live location sensor: a trace records the fixes (and
//! provider failures) a device observed, and the player re-delivers them
//! over a channel.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod player;
pub mod trace;

pub use player::{Pacing, PlayerError, PlayerHandle, TracePlayer};
pub use trace::{FailureEntry, FailureKind, FixEntry, Trace, TraceEntry, TraceError};
