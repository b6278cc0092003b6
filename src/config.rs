use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

use crate::provider::{Permission, SamplingPolicy};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// `-` reads readings from stdin, anything else is a file path.
    pub input: String,
    pub provider_time_interval_ms: i64,
    pub provider_distance_interval_m: f64,
    pub display_tick_ms: u64,
    pub location_permission: Permission,
    pub log_level: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let input = env::var("TRACKER_INPUT").unwrap_or_else(|_| "-".to_string());
        let provider_time_interval_ms = env::var("PROVIDER_TIME_INTERVAL_MS")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .unwrap_or(5000);
        let provider_distance_interval_m = env::var("PROVIDER_DISTANCE_INTERVAL_M")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10.0);
        let display_tick_ms =
            parse_display_tick_ms(&env::var("DISPLAY_TICK_MS").unwrap_or_default());

        let location_permission = match env::var("LOCATION_PERMISSION")
            .unwrap_or_else(|_| "granted".to_string())
            .to_lowercase()
            .as_str()
        {
            "denied" => Permission::Denied,
            _ => Permission::Granted,
        };

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            input,
            provider_time_interval_ms,
            provider_distance_interval_m,
            display_tick_ms,
            location_permission,
            log_level,
        })
    }

    pub fn sampling_policy(&self) -> SamplingPolicy {
        SamplingPolicy {
            time_interval_ms: self.provider_time_interval_ms,
            distance_interval_m: self.provider_distance_interval_m,
        }
    }
}

/// A zero tick is as unusable as a garbled one, both fall back to 1 s.
fn parse_display_tick_ms(raw: &str) -> u64 {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|ms| *ms > 0)
        .unwrap_or(1000)
}
