use anyhow::{Context, Result};
use mongodb_monitor::{logging, MonitorConfig, Runner};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = MonitorConfig::load().await.context("Failed to load configuration")?;

    let _guard = logging::init(&config.log).context("Failed to initialize logging")?;
    info!(
        "mongodb-monitor v{} starting, {} instance(s)",
        env!("CARGO_PKG_VERSION"),
        config.instances.len()
    );

    let runner = Runner::from_config(&config).context("Failed to create runner")?;
    let summary = runner.run().await;

    info!(
        "Run complete - {} instance(s), {} unreachable, {} failed, {} record(s)",
        summary.instances, summary.unreachable, summary.failed, summary.records
    );

    Ok(())
}
