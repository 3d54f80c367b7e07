//! Trace playback.
//!
//! The player sends recorded entries through a channel, either as fast as
//! the receiver drains them or paced by the gaps between recorded
//! timestamps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, trace};

use crate::trace::{Trace, TraceEntry};

/// Upper bound on an individual sleep so a stop signal is noticed promptly
/// even inside a long recorded gap.
const STOP_POLL_INTERVAL_MS: u64 = 250;

/// Errors that can occur during playback.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The player is already playing.
    #[error("trace player is already playing")]
    AlreadyPlaying,
}

/// Result type for player operations.
pub type Result<T> = std::result::Result<T, PlayerError>;

/// How playback is paced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pacing {
    /// Send entries back to back without waiting.
    #[default]
    Immediate,

    /// Sleep between entries for the gap between their recorded timestamps.
    Recorded,
}

/// Plays a recorded trace over a channel.
///
/// Playback runs until the trace is exhausted, the receiver is dropped, or
/// `stop()` is called.
#[derive(Debug)]
pub struct TracePlayer {
    trace: Trace,
    pacing: Pacing,
    playing: Arc<AtomicBool>,
}

impl TracePlayer {
    /// Create a player for the given trace.
    #[must_use]
    pub fn new(trace: Trace, pacing: Pacing) -> Self {
        Self {
            trace,
            pacing,
            playing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The trace being played.
    #[must_use]
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Check if playback is in progress.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    /// Play the trace, sending each entry through the channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the player is already playing.
    pub async fn play(&mut self, tx: mpsc::Sender<TraceEntry>) -> Result<()> {
        if self.playing.swap(true, Ordering::SeqCst) {
            return Err(PlayerError::AlreadyPlaying);
        }

        debug!(
            entries = self.trace.len(),
            pacing = ?self.pacing,
            "Starting trace playback"
        );

        let mut prev_timestamp: Option<i64> = None;

        for entry in self.trace.entries() {
            if !self.playing.load(Ordering::SeqCst) {
                debug!("Playback stopped");
                break;
            }

            if self.pacing == Pacing::Recorded {
                if let Some(prev) = prev_timestamp {
                    let gap_ms = entry.timestamp_ms() - prev;
                    if gap_ms > 0 {
                        trace!(gap_ms, "Waiting for recorded gap");
                        self.wait_for_gap(gap_ms.unsigned_abs()).await;
                    }
                }
            }
            prev_timestamp = Some(entry.timestamp_ms());

            if !self.playing.load(Ordering::SeqCst) {
                debug!("Playback stopped during gap");
                break;
            }

            if tx.send(entry.clone()).await.is_err() {
                debug!("Playback channel closed, stopping");
                break;
            }
        }

        self.playing.store(false, Ordering::SeqCst);
        debug!("Trace playback finished");
        Ok(())
    }

    /// Sleep through a recorded gap in slices, waking early on stop.
    async fn wait_for_gap(&self, gap_ms: u64) {
        let mut remaining_ms = gap_ms;
        while remaining_ms > 0 && self.playing.load(Ordering::SeqCst) {
            let slice = remaining_ms.min(STOP_POLL_INTERVAL_MS);
            sleep(Duration::from_millis(slice)).await;
            remaining_ms -= slice;
        }
    }

    /// Stop playback.
    pub fn stop(&self) {
        debug!("Stopping trace playback");
        self.playing.store(false, Ordering::SeqCst);
    }

    /// Get a handle that can stop playback from another task.
    #[must_use]
    pub fn stop_handle(&self) -> PlayerHandle {
        PlayerHandle {
            playing: Arc::clone(&self.playing),
        }
    }
}

/// A handle to stop a running [`TracePlayer`].
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    playing: Arc<AtomicBool>,
}

impl PlayerHandle {
    /// Stop playback.
    pub fn stop(&self) {
        self.playing.store(false, Ordering::SeqCst);
    }

    /// Check if playback is still in progress.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}
