use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::TrackerError;
use crate::format::{format_distance, format_duration};
use crate::geo::Coordinate;
use crate::models::{JourneySession, RawPositionReading, TrackingPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrackerState {
    Idle,
    Tracking,
}

/// What the display layer shows on every tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplaySnapshot {
    pub duration: String,
    pub distance: String,
    pub speed_mps: f64,
    pub current_position: Option<Coordinate>,
}

/// Turns a stream of position readings into a [`JourneySession`].
///
/// The tracker performs no I/O and owns no timers. Subscribing to a location
/// provider and driving the display tick are left to the caller.
#[derive(Debug, Default)]
pub struct JourneyTracker {
    session: JourneySession,
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

impl JourneyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TrackerState {
        if self.session.is_active() {
            TrackerState::Tracking
        } else {
            TrackerState::Idle
        }
    }

    pub fn session(&self) -> &JourneySession {
        &self.session
    }

    pub fn start(&mut self) -> JourneySession {
        self.start_at(now_ms())
    }

    /// Begins a fresh session at `now` (epoch ms). A no-op while already tracking.
    pub fn start_at(&mut self, now: i64) -> JourneySession {
        if self.state() == TrackerState::Tracking {
            debug!("Ignored start for active session {}", self.session.id());
            return self.session.clone();
        }

        self.session = JourneySession::begin(now);
        info!("Started journey {}", self.session.id());
        self.session.clone()
    }

    /// Feeds one reading into the active session.
    ///
    /// Readings arriving while idle are dropped. Readings with non-finite or
    /// out-of-range coordinates are rejected and leave the session untouched.
    pub fn on_sample(&mut self, reading: &RawPositionReading) -> Result<(), TrackerError> {
        if self.state() == TrackerState::Idle {
            debug!("Discarded sample while idle");
            return Ok(());
        }

        let coordinate = Coordinate::new(reading.latitude, reading.longitude);
        if !coordinate.is_valid() {
            return Err(TrackerError::InvalidSample {
                latitude: reading.latitude,
                longitude: reading.longitude,
            });
        }

        let point = TrackingPoint::from(reading);
        if let Some(last) = self.session.last_point() {
            if point.timestamp() <= last.timestamp() {
                warn!(
                    "Out-of-order sample: {} after {}",
                    point.timestamp(),
                    last.timestamp()
                );
            }
        }

        self.session.push(point);
        debug!(
            "Journey {}: {} points, {:.1} m",
            self.session.id(),
            self.session.points().len(),
            self.session.total_distance_meters()
        );
        Ok(())
    }

    pub fn stop(&mut self) -> JourneySession {
        self.stop_at(now_ms())
    }

    /// Freezes the session at `now` (epoch ms) and returns it. A no-op while idle.
    pub fn stop_at(&mut self, now: i64) -> JourneySession {
        if self.state() == TrackerState::Idle {
            return self.session.clone();
        }

        let duration = self.elapsed_seconds(now);
        self.session.finish(duration);
        info!(
            "Stopped journey {} after {} with {} ({} points)",
            self.session.id(),
            format_duration(duration),
            format_distance(self.session.total_distance_meters()),
            self.session.points().len()
        );
        self.session.clone()
    }

    /// Whole seconds since `start()`, or `0` when idle.
    pub fn elapsed_seconds(&self, now: i64) -> i64 {
        match self.session.started_at() {
            Some(started_at) => now.saturating_sub(started_at).max(0) / 1000,
            None => 0,
        }
    }

    pub fn display(&self, now: i64) -> DisplaySnapshot {
        let last = self.session.last_point();
        DisplaySnapshot {
            duration: format_duration(self.elapsed_seconds(now)),
            distance: format_distance(self.session.total_distance_meters()),
            speed_mps: last.map(TrackingPoint::speed).unwrap_or(0.0),
            current_position: last.map(TrackingPoint::coordinate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(lat: f64, lon: f64, ts: i64) -> RawPositionReading {
        RawPositionReading::new(lat, lon, ts)
    }

    fn equator_walk(tracker: &mut JourneyTracker) {
        tracker.on_sample(&reading(0.0, 0.0, 1_000)).unwrap();
        tracker.on_sample(&reading(0.0, 0.001, 6_000)).unwrap();
        tracker.on_sample(&reading(0.0, 0.002, 11_000)).unwrap();
    }

    #[test]
    fn test_three_samples_along_equator() {
        let mut tracker = JourneyTracker::new();
        tracker.start_at(0);
        equator_walk(&mut tracker);

        let session = tracker.session();
        assert_eq!(session.points().len(), 3);
        assert!(
            (session.total_distance_meters() - 222.39).abs() < 1.0,
            "got {}",
            session.total_distance_meters()
        );
    }

    #[test]
    fn test_start_is_idempotent_while_tracking() {
        let mut tracker = JourneyTracker::new();
        let first = tracker.start_at(0);
        equator_walk(&mut tracker);

        let again = tracker.start_at(5_000);
        assert_eq!(again.id(), first.id());
        assert_eq!(again.started_at(), Some(0));
        assert_eq!(again.points().len(), 3);
        assert_eq!(
            again.total_distance_meters(),
            tracker.session().total_distance_meters()
        );
    }

    #[test]
    fn test_sample_while_idle_is_discarded() {
        let mut tracker = JourneyTracker::new();
        assert!(tracker.on_sample(&reading(41.38, 2.12, 0)).is_ok());
        assert_eq!(tracker.state(), TrackerState::Idle);
        assert!(tracker.session().points().is_empty());
        assert_eq!(tracker.session().total_distance_meters(), 0.0);
    }

    #[test]
    fn test_sample_after_stop_does_not_resurrect_session() {
        let mut tracker = JourneyTracker::new();
        tracker.start_at(0);
        tracker.on_sample(&reading(41.38, 2.12, 1_000)).unwrap();
        let stopped = tracker.stop_at(10_000);

        tracker.on_sample(&reading(41.39, 2.13, 11_000)).unwrap();
        assert_eq!(tracker.state(), TrackerState::Idle);
        assert_eq!(tracker.session().points().len(), 1);
        assert_eq!(tracker.session(), &stopped);
    }

    #[test]
    fn test_invalid_latitude_is_rejected() {
        let mut tracker = JourneyTracker::new();
        tracker.start_at(0);
        tracker.on_sample(&reading(0.0, 0.0, 1_000)).unwrap();
        tracker.on_sample(&reading(0.0, 0.001, 2_000)).unwrap();
        let before = tracker.session().total_distance_meters();

        let err = tracker.on_sample(&reading(91.0, 0.0, 3_000)).unwrap_err();
        assert_eq!(
            err,
            TrackerError::InvalidSample {
                latitude: 91.0,
                longitude: 0.0
            }
        );
        assert_eq!(tracker.session().total_distance_meters(), before);
        assert_eq!(tracker.session().points().len(), 2);

        assert!(tracker.on_sample(&reading(f64::NAN, 0.0, 3_000)).is_err());
        assert!(tracker.on_sample(&reading(0.0, -180.01, 3_000)).is_err());
        assert!(tracker.session().total_distance_meters().is_finite());
    }

    #[test]
    fn test_out_of_order_sample_is_still_counted() {
        let mut tracker = JourneyTracker::new();
        tracker.start_at(0);
        tracker.on_sample(&reading(0.0, 0.0, 5_000)).unwrap();
        tracker.on_sample(&reading(0.0, 0.001, 5_000)).unwrap();
        tracker.on_sample(&reading(0.0, 0.002, 4_000)).unwrap();

        assert_eq!(tracker.session().points().len(), 3);
        assert!((tracker.session().total_distance_meters() - 222.39).abs() < 1.0);
    }

    #[test]
    fn test_distance_never_decreases() {
        let mut tracker = JourneyTracker::new();
        tracker.start_at(0);
        let path = [
            (41.3809, 2.1228),
            (41.3815, 2.1240),
            (41.3815, 2.1240),
            (41.3802, 2.1251),
            (41.3809, 2.1228),
        ];
        let mut previous = 0.0;
        for (i, (lat, lon)) in path.iter().enumerate() {
            tracker.on_sample(&reading(*lat, *lon, i as i64 * 1_000)).unwrap();
            let total = tracker.session().total_distance_meters();
            assert!(total >= previous);
            previous = total;
        }
    }

    #[test]
    fn test_distance_is_independent_of_batching() {
        let path: Vec<RawPositionReading> = (0..10)
            .map(|i| reading(41.38 + i as f64 * 0.0003, 2.12 - i as f64 * 0.0002, i * 1_000))
            .collect();

        let mut whole = JourneyTracker::new();
        whole.start_at(0);
        for r in &path {
            whole.on_sample(r).unwrap();
        }

        let mut split = JourneyTracker::new();
        split.start_at(0);
        for chunk in path.chunks(3) {
            for r in chunk {
                split.on_sample(r).unwrap();
            }
        }

        let expected: f64 = whole
            .session()
            .points()
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum();
        assert!((whole.session().total_distance_meters() - expected).abs() < 1e-6);
        assert_eq!(
            whole.session().total_distance_meters(),
            split.session().total_distance_meters()
        );
    }

    #[test]
    fn test_stop_freezes_and_reports_duration() {
        let mut tracker = JourneyTracker::new();
        tracker.start_at(1_000);
        equator_walk(&mut tracker);
        assert_eq!(tracker.elapsed_seconds(66_000), 65);

        let summary = tracker.stop_at(66_000);
        assert!(!summary.is_active());
        assert_eq!(summary.duration_seconds(), 65);
        assert_eq!(summary.points().len(), 3);
        assert_eq!(tracker.elapsed_seconds(100_000), 0);

        // stopping twice hands back the same snapshot
        assert_eq!(tracker.stop_at(200_000), summary);
    }

    #[test]
    fn test_restart_replaces_session() {
        let mut tracker = JourneyTracker::new();
        let first = tracker.start_at(0);
        equator_walk(&mut tracker);
        tracker.stop_at(20_000);

        let second = tracker.start_at(30_000);
        assert_ne!(second.id(), first.id());
        assert!(second.points().is_empty());
        assert_eq!(second.total_distance_meters(), 0.0);
        assert_eq!(second.started_at(), Some(30_000));
    }

    #[test]
    fn test_elapsed_seconds_idle_and_clock_skew() {
        let mut tracker = JourneyTracker::new();
        assert_eq!(tracker.elapsed_seconds(10_000), 0);
        tracker.start_at(10_000);
        assert_eq!(tracker.elapsed_seconds(9_000), 0);
        assert_eq!(tracker.elapsed_seconds(10_999), 0);
        assert_eq!(tracker.elapsed_seconds(11_000), 1);
    }

    #[test]
    fn test_display_snapshot() {
        let mut tracker = JourneyTracker::new();
        assert_eq!(
            tracker.display(0),
            DisplaySnapshot {
                duration: "0:00".to_string(),
                distance: "0 m".to_string(),
                speed_mps: 0.0,
                current_position: None,
            }
        );

        tracker.start_at(0);
        tracker.on_sample(&reading(0.0, 0.0, 1_000)).unwrap();
        tracker
            .on_sample(&reading(0.0, 0.001, 2_000).with_speed(1.5))
            .unwrap();

        let snapshot = tracker.display(65_000);
        assert_eq!(snapshot.duration, "1:05");
        assert_eq!(snapshot.distance, "111 m");
        assert_eq!(snapshot.speed_mps, 1.5);
        assert_eq!(snapshot.current_position, Some(Coordinate::new(0.0, 0.001)));
    }

    #[test]
    fn test_returned_session_is_a_copy() {
        let mut tracker = JourneyTracker::new();
        let started = tracker.start_at(0);
        equator_walk(&mut tracker);
        assert!(started.points().is_empty());
        assert_eq!(tracker.session().points().len(), 3);
    }
}
