use serde::Serialize;

use crate::geo::Coordinate;
use crate::models::reading::RawPositionReading;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackingPoint {
    latitude: f64,
    longitude: f64,
    timestamp: i64,
    speed: f64,
    heading: f64,
}

impl TrackingPoint {
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Epoch milliseconds.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Meters per second, `0` when the provider had none.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Degrees in `[0, 360)`, `0` when the provider had none.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    pub fn distance_to(&self, other: &TrackingPoint) -> f64 {
        self.coordinate().distance_to(&other.coordinate())
    }
}

impl From<&RawPositionReading> for TrackingPoint {
    fn from(reading: &RawPositionReading) -> Self {
        // iOS reports -1 for an unknown speed or course
        let speed = reading
            .speed
            .filter(|s| s.is_finite() && *s >= 0.0)
            .unwrap_or(0.0);
        let heading = reading
            .heading
            .filter(|h| h.is_finite() && *h >= 0.0)
            .map(|h| h.rem_euclid(360.0))
            .unwrap_or(0.0);

        Self {
            latitude: reading.latitude,
            longitude: reading.longitude,
            timestamp: reading.timestamp,
            speed,
            heading,
        }
    }
}
