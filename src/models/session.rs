use serde::Serialize;
use uuid::Uuid;

use crate::geo::Coordinate;
use crate::models::point::TrackingPoint;

/// Aggregate of one start-to-stop tracking run.
///
/// Only the tracker mutates a session; everything handed out is a clone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JourneySession {
    id: Uuid,
    points: Vec<TrackingPoint>,
    total_distance_meters: f64,
    started_at: Option<i64>,
    duration_seconds: i64,
}

impl Default for JourneySession {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            points: Vec::new(),
            total_distance_meters: 0.0,
            started_at: None,
            duration_seconds: 0,
        }
    }
}

impl JourneySession {
    pub(crate) fn begin(started_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Some(started_at),
            ..Default::default()
        }
    }

    /// Appends `point`, adding the leg from the previous last point.
    pub(crate) fn push(&mut self, point: TrackingPoint) {
        if let Some(last) = self.points.last() {
            self.total_distance_meters += last.distance_to(&point);
        }
        self.points.push(point);
    }

    pub(crate) fn finish(&mut self, duration_seconds: i64) {
        self.started_at = None;
        self.duration_seconds = duration_seconds;
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn points(&self) -> &[TrackingPoint] {
        &self.points
    }

    pub fn total_distance_meters(&self) -> f64 {
        self.total_distance_meters
    }

    /// Epoch ms of `start()`, `None` once the session is no longer active.
    pub fn started_at(&self) -> Option<i64> {
        self.started_at
    }

    pub fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    /// Length of a finished run; `0` while still active.
    pub fn duration_seconds(&self) -> i64 {
        self.duration_seconds
    }

    pub fn first_point(&self) -> Option<&TrackingPoint> {
        self.points.first()
    }

    pub fn last_point(&self) -> Option<&TrackingPoint> {
        self.points.last()
    }

    /// Polyline for the map surface, in visiting order.
    pub fn route(&self) -> Vec<Coordinate> {
        self.points.iter().map(TrackingPoint::coordinate).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::reading::RawPositionReading;

    fn point(lat: f64, lon: f64, ts: i64) -> TrackingPoint {
        TrackingPoint::from(&RawPositionReading::new(lat, lon, ts))
    }

    #[test]
    fn test_first_point_adds_no_distance() {
        let mut session = JourneySession::begin(0);
        session.push(point(41.38, 2.12, 0));
        assert_eq!(session.total_distance_meters(), 0.0);
        assert_eq!(session.points().len(), 1);
    }

    #[test]
    fn test_distance_is_sum_of_legs() {
        let path = [(0.0, 0.0), (0.0, 0.001), (0.001, 0.001), (0.001, 0.0)];
        let mut session = JourneySession::begin(0);
        for (i, (lat, lon)) in path.iter().enumerate() {
            session.push(point(*lat, *lon, i as i64 * 1000));
        }

        let expected: f64 = session
            .points()
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum();
        assert!((session.total_distance_meters() - expected).abs() < 1e-9);
        assert_eq!(session.route().len(), 4);
        assert_eq!(session.route()[1], Coordinate::new(0.0, 0.001));
    }

    #[test]
    fn test_finish_clears_start() {
        let mut session = JourneySession::begin(1_000);
        assert!(session.is_active());
        session.finish(42);
        assert!(!session.is_active());
        assert_eq!(session.started_at(), None);
        assert_eq!(session.duration_seconds(), 42);
    }

    #[test]
    fn test_default_is_idle() {
        let session = JourneySession::default();
        assert!(!session.is_active());
        assert!(session.last_point().is_none());
        assert!(session.route().is_empty());
    }
}
