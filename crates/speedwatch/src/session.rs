//! The watch session: one event handler over the location stream.
//!
//! The session is the caller the estimator is specified against: it rejects
//! invalid fixes, feeds valid ones to the estimator, compares readings
//! against the speed limit, and renders everything to the display surface.
//! Each event is handled synchronously; the only asynchrony is waiting for
//! the next event.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::display::DisplaySurface;
use crate::error::{Error, Result};
use crate::estimator::SpeedEstimator;
use crate::limit::SpeedLimit;
use crate::source::{LocationSource, WatchEvent, WatchOptions};

/// Status shown when a valid fix was processed.
pub const STATUS_ACQUIRED: &str = "Location acquired.";

/// Status shown when a fix with unusable coordinates arrived.
pub const STATUS_INVALID_FIX: &str = "Could not obtain a location. Try again.";

/// Status shown when no location source is available at all.
pub const STATUS_UNSUPPORTED: &str = "Location sensing is not available on this device.";

/// Status shown when the source lacks permission before subscribing.
pub const STATUS_NO_PERMISSION: &str =
    "Location permission denied. Check your device settings.";

/// Capacity of the event channel between a source and the session.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Consumes location events and drives the display.
#[derive(Debug)]
pub struct WatchSession<D> {
    estimator: SpeedEstimator,
    limit: SpeedLimit,
    display: D,
}

impl<D: DisplaySurface> WatchSession<D> {
    /// Create a session with the given limit and display surface.
    #[must_use]
    pub fn new(limit: SpeedLimit, display: D) -> Self {
        Self {
            estimator: SpeedEstimator::new(),
            limit,
            display,
        }
    }

    /// The active speed limit.
    #[must_use]
    pub fn limit(&self) -> &SpeedLimit {
        &self.limit
    }

    /// The display surface.
    #[must_use]
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Handle one event from the location stream.
    pub fn handle_event(&mut self, event: WatchEvent) {
        match event {
            WatchEvent::Position(fix) => {
                if !fix.has_valid_coordinates() {
                    warn!(
                        latitude = fix.latitude,
                        longitude = fix.longitude,
                        "Rejecting fix with invalid coordinates"
                    );
                    self.display.show_status(STATUS_INVALID_FIX);
                    return;
                }

                let reading = self.estimator.update(&fix);
                debug!(%reading, "Processed fix");

                self.display.show_status(STATUS_ACQUIRED);
                self.display.show_speed(&reading);

                if self.limit.is_exceeded_by(&reading) {
                    let text =
                        format!("⚠ Over the speed limit of {} km/h!", self.limit.kmh());
                    self.display.show_warning(Some(&text));
                } else {
                    self.display.show_warning(None);
                }
            }
            WatchEvent::Failure(error) => {
                warn!(%error, "Location provider failure");
                self.display.show_status(error.status_message());
                if error.shows_hints() {
                    self.display.show_hints();
                }
            }
        }
    }

    /// Handle events until the channel closes.
    pub async fn run(&mut self, mut rx: mpsc::Receiver<WatchEvent>) {
        while let Some(event) = rx.recv().await {
            self.handle_event(event);
        }
        debug!("Event stream ended");
    }

    /// Subscribe to a source and handle its events until it runs dry.
    ///
    /// Availability and permission are probed before subscribing; an
    /// unavailable source renders the unsupported status and returns, a
    /// source without permission renders the permission status but is still
    /// subscribed so the provider can report its own failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the source fails to start or its task panics.
    pub async fn watch<S>(&mut self, mut source: S, options: WatchOptions) -> Result<()>
    where
        S: LocationSource + 'static,
    {
        if !source.is_available() {
            self.display.show_status(STATUS_UNSUPPORTED);
            return Ok(());
        }
        if !source.has_permission() {
            self.display.show_status(STATUS_NO_PERMISSION);
        }

        let name = source.name();
        info!(source = name, "Starting watch session");

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let task = tokio::spawn(async move { source.start(tx, &options).await });

        self.run(rx).await;

        match task.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(Error::source_start(name, e.to_string())),
            Err(e) => Err(Error::internal(format!("source task failed: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::SpeedReading;
    use crate::fix::Fix;
    use crate::source::{PositionError, SourceStatus};
    use chrono::{DateTime, TimeZone, Utc};

    /// Records every display call so tests can assert on the rendered
    /// sequence, driven by scripted events instead of a live sensor.
    #[derive(Debug, Default)]
    struct RecordingDisplay {
        statuses: Vec<String>,
        speeds: Vec<SpeedReading>,
        warnings: Vec<Option<String>>,
        hints_shown: usize,
    }

    impl DisplaySurface for RecordingDisplay {
        fn show_status(&mut self, status: &str) {
            self.statuses.push(status.to_string());
        }

        fn show_speed(&mut self, reading: &SpeedReading) {
            self.speeds.push(*reading);
        }

        fn show_warning(&mut self, warning: Option<&str>) {
            self.warnings.push(warning.map(String::from));
        }

        fn show_hints(&mut self) {
            self.hints_shown += 1;
        }
    }

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    fn session() -> WatchSession<RecordingDisplay> {
        WatchSession::new(SpeedLimit::default(), RecordingDisplay::default())
    }

    #[test]
    fn test_valid_fix_renders_status_and_speed() {
        let mut session = session();
        let fix = Fix::new(0.0, 0.0, at(0)).with_speed(10.0);

        session.handle_event(WatchEvent::Position(fix));

        let display = session.display();
        assert_eq!(display.statuses, vec![STATUS_ACQUIRED]);
        assert_eq!(display.speeds, vec![SpeedReading::Kmh(36.0)]);
        assert_eq!(display.warnings, vec![None]);
    }

    #[test]
    fn test_over_limit_raises_warning() {
        let mut session = session();
        let fix = Fix::new(0.0, 0.0, at(0)).with_speed(12.5); // 45 km/h

        session.handle_event(WatchEvent::Position(fix));

        let display = session.display();
        let warning = display.warnings[0].as_deref().unwrap();
        assert!(warning.contains("40"));
        assert!(warning.contains("speed limit"));
    }

    #[test]
    fn test_below_raised_limit_no_warning() {
        let limit = SpeedLimit::new(50.0).unwrap();
        let mut session = WatchSession::new(limit, RecordingDisplay::default());
        let fix = Fix::new(0.0, 0.0, at(0)).with_speed(12.5); // 45 km/h

        session.handle_event(WatchEvent::Position(fix));

        assert_eq!(session.display().warnings, vec![None]);
    }

    #[test]
    fn test_warning_cleared_when_speed_drops() {
        let mut session = session();
        session.handle_event(WatchEvent::Position(
            Fix::new(0.0, 0.0, at(0)).with_speed(20.0), // 72 km/h
        ));
        session.handle_event(WatchEvent::Position(
            Fix::new(0.0, 0.0, at(1000)).with_speed(5.0), // 18 km/h
        ));

        let display = session.display();
        assert!(display.warnings[0].is_some());
        assert!(display.warnings[1].is_none());
    }

    #[test]
    fn test_unavailable_reading_never_warns() {
        let mut session = session();
        // First fix with no direct speed and no prior state
        session.handle_event(WatchEvent::Position(Fix::new(0.0, 0.0, at(0))));

        let display = session.display();
        assert_eq!(display.speeds, vec![SpeedReading::Unavailable]);
        assert_eq!(display.warnings, vec![None]);
    }

    #[test]
    fn test_invalid_fix_rejected_before_estimation() {
        let mut session = session();
        session.handle_event(WatchEvent::Position(Fix::new(f64::NAN, 0.0, at(0))));

        let display = session.display();
        assert_eq!(display.statuses, vec![STATUS_INVALID_FIX]);
        assert!(display.speeds.is_empty());
        assert!(display.warnings.is_empty());
    }

    #[test]
    fn test_invalid_fix_does_not_touch_estimator_state() {
        let mut session = session();
        session.handle_event(WatchEvent::Position(Fix::new(0.0, 0.0, at(0))));
        session.handle_event(WatchEvent::Position(Fix::new(200.0, 0.0, at(500))));
        // The invalid fix must not have become the comparison point.
        session.handle_event(WatchEvent::Position(Fix::new(0.0, 0.0, at(1000))));

        let display = session.display();
        assert_eq!(
            display.speeds,
            vec![SpeedReading::Unavailable, SpeedReading::Kmh(0.0)]
        );
    }

    #[test]
    fn test_failure_renders_status_and_hints() {
        let mut session = session();
        session.handle_event(WatchEvent::Failure(PositionError::Timeout));

        let display = session.display();
        assert_eq!(
            display.statuses,
            vec![PositionError::Timeout.status_message()]
        );
        assert_eq!(display.hints_shown, 1);
    }

    #[test]
    fn test_unknown_failure_has_no_hints() {
        let mut session = session();
        session.handle_event(WatchEvent::Failure(PositionError::Unknown));

        let display = session.display();
        assert_eq!(
            display.statuses,
            vec![PositionError::Unknown.status_message()]
        );
        assert_eq!(display.hints_shown, 0);
    }

    #[test]
    fn test_each_failure_has_distinct_status() {
        let mut session = session();
        for error in [
            PositionError::PermissionDenied,
            PositionError::PositionUnavailable,
            PositionError::Timeout,
            PositionError::Unknown,
        ] {
            session.handle_event(WatchEvent::Failure(error));
        }

        let statuses = &session.display().statuses;
        let unique: std::collections::HashSet<_> = statuses.iter().collect();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn test_scripted_drive_sequence() {
        // A short drive: first fix, speeding, slowing back down.
        let mut session = session();
        let events = vec![
            WatchEvent::Position(Fix::new(0.0, 0.0, at(0))),
            WatchEvent::Position(Fix::new(0.0, 0.0, at(1000)).with_speed(15.0)), // 54
            WatchEvent::Position(Fix::new(0.0, 0.0, at(2000)).with_speed(8.0)),  // 28.8
        ];
        for event in events {
            session.handle_event(event);
        }

        let display = session.display();
        assert_eq!(
            display.speeds,
            vec![
                SpeedReading::Unavailable,
                SpeedReading::Kmh(54.0),
                SpeedReading::Kmh(28.8),
            ]
        );
        assert_eq!(
            display.warnings,
            vec![
                None,
                Some("⚠ Over the speed limit of 40 km/h!".to_string()),
                None
            ]
        );
    }

    #[tokio::test]
    async fn test_run_consumes_until_channel_closes() {
        let mut session = session();
        let (tx, rx) = mpsc::channel(8);

        tx.send(WatchEvent::Position(Fix::new(0.0, 0.0, at(0))))
            .await
            .unwrap();
        tx.send(WatchEvent::Failure(PositionError::PositionUnavailable))
            .await
            .unwrap();
        drop(tx);

        session.run(rx).await;

        let display = session.display();
        assert_eq!(display.statuses.len(), 2);
    }

    /// A source that scripts its events, for exercising `watch` end to end.
    #[derive(Debug)]
    struct ScriptedSource {
        events: Vec<WatchEvent>,
        available: bool,
        permitted: bool,
    }

    #[async_trait::async_trait]
    impl LocationSource for ScriptedSource {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn has_permission(&self) -> bool {
            self.permitted
        }

        fn is_watching(&self) -> bool {
            false
        }

        fn status(&self) -> SourceStatus {
            SourceStatus::idle()
        }

        async fn start(
            &mut self,
            tx: mpsc::Sender<WatchEvent>,
            _options: &WatchOptions,
        ) -> crate::source::Result<()> {
            for event in self.events.drain(..) {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
            Ok(())
        }

        fn stop(&self) -> crate::source::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_watch_with_scripted_source() {
        let mut session = session();
        let source = ScriptedSource {
            events: vec![
                WatchEvent::Position(Fix::new(0.0, 0.0, at(0)).with_speed(12.5)),
                WatchEvent::Failure(PositionError::Timeout),
            ],
            available: true,
            permitted: true,
        };

        session.watch(source, WatchOptions::default()).await.unwrap();

        let display = session.display();
        assert_eq!(display.statuses.len(), 2);
        assert_eq!(display.speeds, vec![SpeedReading::Kmh(45.0)]);
        assert_eq!(display.hints_shown, 1);
    }

    #[tokio::test]
    async fn test_watch_unavailable_source() {
        let mut session = session();
        let source = ScriptedSource {
            events: vec![WatchEvent::Position(Fix::new(0.0, 0.0, at(0)))],
            available: false,
            permitted: true,
        };

        session.watch(source, WatchOptions::default()).await.unwrap();

        let display = session.display();
        assert_eq!(display.statuses, vec![STATUS_UNSUPPORTED]);
        assert!(display.speeds.is_empty());
    }

    #[tokio::test]
    async fn test_watch_without_permission_still_subscribes() {
        let mut session = session();
        let source = ScriptedSource {
            events: vec![WatchEvent::Failure(PositionError::PermissionDenied)],
            available: true,
            permitted: false,
        };

        session.watch(source, WatchOptions::default()).await.unwrap();

        let display = session.display();
        assert_eq!(display.statuses.len(), 2);
        assert_eq!(display.statuses[0], STATUS_NO_PERMISSION);
        assert_eq!(
            display.statuses[1],
            PositionError::PermissionDenied.status_message()
        );
    }
}
