//! Live GPS journey tracking: position readings in, distance, duration and
//! route out.

pub mod config;
pub mod error;
pub mod format;
pub mod geo;
pub mod models;
pub mod provider;
pub mod runner;
pub mod tracker;

pub use error::TrackerError;
pub use tracker::{DisplaySnapshot, JourneyTracker, TrackerState};
