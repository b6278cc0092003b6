//! Location provider and permission gate consumed by the runner.
//!
//! A provider hands out a stream of readings on `subscribe`; dropping the
//! stream is the unsubscribe.

use anyhow::{anyhow, Result};
use futures::stream::{self, Stream};
use serde::Deserialize;
use std::pin::Pin;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::geo::Coordinate;
use crate::models::RawPositionReading;

pub type LocationStream = Pin<Box<dyn Stream<Item = RawPositionReading> + Send>>;

pub trait LocationProvider {
    fn subscribe(&mut self) -> Result<LocationStream>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
}

pub trait PermissionGate {
    fn check(&self) -> Permission;
}

/// Gate with a fixed answer, taken from configuration.
#[derive(Debug, Clone, Copy)]
pub struct StaticPermission(pub Permission);

impl PermissionGate for StaticPermission {
    fn check(&self) -> Permission {
        self.0
    }
}

/// Emit a reading once `time_interval_ms` has passed or `distance_interval_m`
/// has been covered since the last emitted one, whichever comes first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingPolicy {
    pub time_interval_ms: i64,
    pub distance_interval_m: f64,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            time_interval_ms: 5_000,
            distance_interval_m: 10.0,
        }
    }
}

#[derive(Debug)]
struct Sampler {
    policy: SamplingPolicy,
    last: Option<(i64, Coordinate)>,
}

impl Sampler {
    fn new(policy: SamplingPolicy) -> Self {
        Self { policy, last: None }
    }

    fn accept(&mut self, reading: &RawPositionReading) -> bool {
        let coordinate = Coordinate::new(reading.latitude, reading.longitude);
        // bad fixes go through so the tracker can reject them
        if !coordinate.is_valid() {
            return true;
        }

        let emit = match self.last {
            None => true,
            Some((timestamp, position)) => {
                reading.timestamp.saturating_sub(timestamp) >= self.policy.time_interval_ms
                    || position.distance_to(&coordinate) >= self.policy.distance_interval_m
            }
        };
        if emit {
            self.last = Some((reading.timestamp, coordinate));
        }
        emit
    }
}

/// Reads newline-delimited JSON readings from an async reader.
pub struct LineProvider<R> {
    reader: Option<R>,
    policy: SamplingPolicy,
}

pub type BoxedReader = Box<dyn AsyncBufRead + Unpin + Send>;

impl<R> LineProvider<R> {
    pub fn new(reader: R, policy: SamplingPolicy) -> Self {
        Self {
            reader: Some(reader),
            policy,
        }
    }
}

impl LineProvider<BoxedReader> {
    /// `-` opens stdin, anything else is a file path.
    pub async fn open(input: &str, policy: SamplingPolicy) -> Result<Self> {
        let reader: BoxedReader = if input == "-" {
            info!("Reading positions from stdin");
            Box::new(BufReader::new(tokio::io::stdin()))
        } else {
            info!("Reading positions from {}", input);
            let file = tokio::fs::File::open(input)
                .await
                .map_err(|e| anyhow!("cannot open {}: {}", input, e))?;
            Box::new(BufReader::new(file))
        };
        Ok(Self::new(reader, policy))
    }
}

impl<R> LocationProvider for LineProvider<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    fn subscribe(&mut self) -> Result<LocationStream> {
        let reader = self
            .reader
            .take()
            .ok_or_else(|| anyhow!("location provider is already subscribed"))?;
        let sampler = Sampler::new(self.policy);

        let readings = stream::unfold(
            (reader.lines(), sampler),
            |(mut lines, mut sampler)| async move {
                loop {
                    match lines.next_line().await {
                        Ok(Some(line)) => {
                            let line = line.trim();
                            if line.is_empty() {
                                continue;
                            }
                            let reading: RawPositionReading = match serde_json::from_str(line) {
                                Ok(r) => r,
                                Err(e) => {
                                    warn!("Failed to parse reading: {}", e);
                                    continue;
                                }
                            };
                            if sampler.accept(&reading) {
                                return Some((reading, (lines, sampler)));
                            }
                        }
                        Ok(None) => return None,
                        Err(e) => {
                            warn!("Position input failed: {}", e);
                            return None;
                        }
                    }
                }
            },
        );

        Ok(Box::pin(readings))
    }
}
