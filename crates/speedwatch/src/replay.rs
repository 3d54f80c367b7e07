//! Replay-backed location source.
//!
//! Adapts a recorded trace into the [`LocationSource`] interface: an inner
//! player delivers raw trace entries, and a conversion task turns them into
//! watch events while applying the subscription options (timeout reporting
//! and stale-sample dropping).

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::DateTime;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use speedwatch_replay::{FailureKind, Pacing, Trace, TraceEntry, TracePlayer};

use crate::fix::Fix;
use crate::source::{
    LocationSource, PositionError, SourceError, SourceStatus, WatchEvent, WatchOptions,
};

/// Capacity of the internal channel between the player and the converter.
const PLAYBACK_CHANNEL_CAPACITY: usize = 100;

/// A location source that replays a recorded trace.
#[derive(Debug)]
pub struct ReplayLocationSource {
    player: TracePlayer,
    watching: Arc<AtomicBool>,
    sample_count: Arc<AtomicU64>,
}

impl ReplayLocationSource {
    /// Create a source over an in-memory trace.
    #[must_use]
    pub fn new(trace: Trace, pacing: Pacing) -> Self {
        Self {
            player: TracePlayer::new(trace, pacing),
            watching: Arc::new(AtomicBool::new(false)),
            sample_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Load a trace file and create a source over it.
    ///
    /// # Errors
    ///
    /// Returns an error if the trace cannot be read or parsed.
    pub fn from_path(path: &Path, pacing: Pacing) -> crate::error::Result<Self> {
        let trace = Trace::from_path(path)?;
        Ok(Self::new(trace, pacing))
    }

    /// Number of fixes delivered so far.
    #[must_use]
    pub fn sample_count(&self) -> u64 {
        self.sample_count.load(Ordering::SeqCst)
    }

    /// Get a handle that can cancel the subscription from another task.
    #[must_use]
    pub fn stop_handle(&self) -> ReplaySourceHandle {
        ReplaySourceHandle {
            watching: Arc::clone(&self.watching),
            player: self.player.stop_handle(),
        }
    }
}

/// A cloneable handle that cancels a running [`ReplayLocationSource`]
/// subscription.
#[derive(Debug, Clone)]
pub struct ReplaySourceHandle {
    watching: Arc<AtomicBool>,
    player: speedwatch_replay::PlayerHandle,
}

impl ReplaySourceHandle {
    /// Stop the subscription.
    pub fn stop(&self) {
        self.player.stop();
        self.watching.store(false, Ordering::SeqCst);
    }

    /// Check if the subscription is still delivering samples.
    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.watching.load(Ordering::SeqCst)
    }
}

fn convert_failure(kind: FailureKind) -> PositionError {
    match kind {
        FailureKind::PermissionDenied => PositionError::PermissionDenied,
        FailureKind::PositionUnavailable => PositionError::PositionUnavailable,
        FailureKind::Timeout => PositionError::Timeout,
        FailureKind::Unknown => PositionError::Unknown,
    }
}

/// Forward raw trace entries as watch events.
///
/// Applies the subscription options: reports a timeout failure when the
/// player stays silent past `options.timeout`, and drops fixes that are
/// stale relative to the newest delivered timestamp when `max_sample_age`
/// is non-zero.
async fn convert_entries(
    mut rx: mpsc::Receiver<TraceEntry>,
    tx: mpsc::Sender<WatchEvent>,
    options: WatchOptions,
    sample_count: Arc<AtomicU64>,
) {
    let max_age_ms = i64::try_from(options.max_sample_age.as_millis()).unwrap_or(i64::MAX);
    let mut newest_ts: Option<i64> = None;

    loop {
        let next = if options.timeout.is_zero() {
            rx.recv().await
        } else {
            match tokio::time::timeout(options.timeout, rx.recv()).await {
                Ok(next) => next,
                Err(_) => {
                    debug!("No sample within the configured timeout");
                    if tx
                        .send(WatchEvent::Failure(PositionError::Timeout))
                        .await
                        .is_err()
                    {
                        break;
                    }
                    continue;
                }
            }
        };

        let Some(entry) = next else {
            debug!("Playback finished");
            break;
        };

        let event = match entry {
            TraceEntry::Fix(raw) => {
                let Some(timestamp) = DateTime::from_timestamp_millis(raw.timestamp_ms)
                else {
                    warn!(
                        timestamp_ms = raw.timestamp_ms,
                        "Skipping fix with out-of-range timestamp"
                    );
                    continue;
                };

                if max_age_ms > 0 {
                    if let Some(newest) = newest_ts {
                        if newest - raw.timestamp_ms > max_age_ms {
                            debug!(
                                timestamp_ms = raw.timestamp_ms,
                                "Dropping stale fix"
                            );
                            continue;
                        }
                    }
                }
                newest_ts = Some(newest_ts.map_or(raw.timestamp_ms, |n| n.max(raw.timestamp_ms)));

                let mut fix = Fix::new(raw.latitude, raw.longitude, timestamp);
                if let Some(speed) = raw.speed_mps {
                    fix = fix.with_speed(speed);
                }
                sample_count.fetch_add(1, Ordering::SeqCst);
                WatchEvent::Position(fix)
            }
            TraceEntry::Failure(raw) => WatchEvent::Failure(convert_failure(raw.error)),
        };

        if tx.send(event).await.is_err() {
            debug!("Watch channel closed");
            break;
        }
    }
}

#[async_trait::async_trait]
impl LocationSource for ReplayLocationSource {
    fn name(&self) -> &'static str {
        "replay"
    }

    fn is_available(&self) -> bool {
        !self.player.trace().is_empty()
    }

    fn has_permission(&self) -> bool {
        // Replaying a recorded trace reads no sensor.
        true
    }

    fn is_watching(&self) -> bool {
        self.watching.load(Ordering::SeqCst)
    }

    fn status(&self) -> SourceStatus {
        if self.is_watching() {
            SourceStatus::watching(self.sample_count())
        } else {
            SourceStatus::idle()
        }
    }

    async fn start(
        &mut self,
        tx: mpsc::Sender<WatchEvent>,
        options: &WatchOptions,
    ) -> crate::source::Result<()> {
        if self.watching.swap(true, Ordering::SeqCst) {
            return Err(SourceError::AlreadyWatching);
        }

        if options.high_accuracy {
            // A recording is as accurate as it was when taken.
            debug!("high_accuracy requested; replay delivers recorded accuracy");
        }

        let (ptx, prx) = mpsc::channel(PLAYBACK_CHANNEL_CAPACITY);
        tokio::spawn(convert_entries(
            prx,
            tx,
            options.clone(),
            Arc::clone(&self.sample_count),
        ));

        let result = self.player.play(ptx).await;
        self.watching.store(false, Ordering::SeqCst);

        result.map_err(|e| SourceError::StartFailed(e.to_string()))
    }

    fn stop(&self) -> crate::source::Result<()> {
        debug!("Stopping replay source");
        self.player.stop();
        self.watching.store(false, Ordering::SeqCst);
        Ok(())
    }
}
