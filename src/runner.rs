use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use uuid::Uuid;

use crate::format::{format_distance, format_duration};
use crate::geo::Coordinate;
use crate::models::{describe_place, JourneySession, Place};
use crate::provider::{LocationProvider, Permission, PermissionGate};
use crate::tracker::JourneyTracker;

/// End-of-run report handed to whoever started the journey.
#[derive(Debug, Clone, Serialize)]
pub struct JourneySummary {
    pub session_id: Uuid,
    pub started_at: Option<String>,
    pub duration: String,
    pub distance: String,
    pub total_distance_meters: f64,
    pub points: usize,
    pub start: Option<String>,
    pub end: Option<String>,
    pub route: Vec<Coordinate>,
}

impl JourneySummary {
    pub fn new(session: &JourneySession, started_at_ms: Option<i64>) -> Self {
        let label = |c: Coordinate| describe_place(Some(&Place::from_geocoded(c, None)));
        Self {
            session_id: session.id(),
            started_at: started_at_ms
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .map(|t| t.to_rfc3339()),
            duration: format_duration(session.duration_seconds()),
            distance: format_distance(session.total_distance_meters()),
            total_distance_meters: session.total_distance_meters(),
            points: session.points().len(),
            start: session.first_point().map(|p| label(p.coordinate())),
            end: session.last_point().map(|p| label(p.coordinate())),
            route: session.route(),
        }
    }
}

/// Drives one journey: start, feed readings, stop.
///
/// Runs until the provider's stream ends or `shutdown` resolves. The stream
/// is dropped before the tracker is stopped so nothing arrives afterwards.
pub async fn run_journey<P, G, F>(
    tracker: &mut JourneyTracker,
    provider: &mut P,
    gate: &G,
    display_tick: Duration,
    shutdown: F,
) -> Result<JourneySummary>
where
    P: LocationProvider,
    G: PermissionGate,
    F: Future<Output = ()>,
{
    if gate.check() == Permission::Denied {
        bail!("location permission denied, cannot start tracking");
    }

    let started = tracker.start();
    let mut readings = match provider.subscribe() {
        Ok(s) => s,
        Err(e) => {
            tracker.stop();
            return Err(e);
        }
    };

    let mut tick = tokio::time::interval(display_tick.max(Duration::from_millis(1)));
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            next = readings.next() => match next {
                Some(reading) => {
                    if let Err(e) = tracker.on_sample(&reading) {
                        warn!("Rejected sample: {}", e);
                    }
                }
                None => {
                    info!("Location stream ended");
                    break;
                }
            },
            _ = tick.tick() => {
                let snapshot = tracker.display(Utc::now().timestamp_millis());
                info!(
                    "{} | {} | {:.1} m/s",
                    snapshot.duration, snapshot.distance, snapshot.speed_mps
                );
            }
            _ = &mut shutdown => {
                info!("Stop requested");
                break;
            }
        }
    }

    drop(readings);
    let session = tracker.stop();
    Ok(JourneySummary::new(&session, started.started_at()))
}
