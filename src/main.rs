use journey_tracker::config::AppConfig;
use journey_tracker::provider::{LineProvider, StaticPermission};
use journey_tracker::runner;
use journey_tracker::JourneyTracker;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = AppConfig::load()?;

    // Init logging, stdout is reserved for the summary
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting journey tracker...");

    let mut provider = LineProvider::open(&config.input, config.sampling_policy()).await?;
    let gate = StaticPermission(config.location_permission);
    let mut tracker = JourneyTracker::new();

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let summary = runner::run_journey(
        &mut tracker,
        &mut provider,
        &gate,
        Duration::from_millis(config.display_tick_ms),
        shutdown,
    )
    .await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
