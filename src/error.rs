use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TrackerError {
    #[error("invalid sample: latitude {latitude}, longitude {longitude}")]
    InvalidSample { latitude: f64, longitude: f64 },
}
