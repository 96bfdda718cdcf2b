//! CERS validator entrypoint: runs query rounds against the miner registry and tracks scores.

use std::sync::Arc;

use mimalloc::MiMalloc;

use cers::config::ValidatorConfig;
use cers::dispatch::{HttpDispatchClient, MinerRegistry};
use cers::shutdown::shutdown_signal;
use cers::validator::{
    MovingAverageSink, RoundDriver, RoundSettings, query_source_from_config,
    reward_engine_from_config,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ValidatorConfig::from_env()?;
    config.validate()?;

    tracing::info!(
        reward_mode = %config.reward_mode,
        query_source = %config.query_source,
        sample_size = config.sample_size,
        timeout_ms = config.timeout.as_millis() as u64,
        "CERS validator starting"
    );

    let registry = MinerRegistry::from_path(&config.miners_path)?;
    tracing::info!(miners = registry.len(), "Miner registry loaded");

    let queries = query_source_from_config(&config);
    let strategy = Arc::new(reward_engine_from_config(&config)?);
    let client = Arc::new(HttpDispatchClient::new(config.timeout)?);
    let sink = Arc::new(MovingAverageSink::new(config.moving_average_alpha));

    let driver = RoundDriver::new(
        queries,
        client,
        strategy,
        sink.clone(),
        registry,
        RoundSettings::from(&config),
    )?;

    let completed = driver.run(shutdown_signal()).await;

    for (uid, score) in sink.scores() {
        tracing::info!(%uid, score, "Final moving-average score");
    }
    tracing::info!(completed, "Validator shutdown complete");
    Ok(())
}
