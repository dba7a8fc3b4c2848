//! Runs both collectors against a fresh prometheus registry until Ctrl-C.
//!
//! This binary does not serve the registry: there is no `/metrics`
//! endpoint, so nothing it collects is visible to a scraper. Exposition
//! belongs to whatever HTTP layer embeds the library.

use anyhow::{Context, Result};
use prometheus::Registry;
use tracing::{error, info};

use intel_gpu_exporter::{
    spawn_collectors, utils::setup_logging, Collector, ExporterConfig, FrequencyCollector,
    GpuTopCollector,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ExporterConfig::default();
    config.validate().context("invalid configuration")?;
    setup_logging(&config.logging).context("failed to initialise logging")?;

    let registry = Registry::new();
    let mut collectors: Vec<Box<dyn Collector>> = Vec::new();

    match GpuTopCollector::new(&registry, config.gpu_top.clone()) {
        Ok(c) => collectors.push(Box::new(c)),
        Err(e) => error!(error = %e, "error starting collector gputop"),
    }
    match FrequencyCollector::new(&registry, &config.frequency) {
        Ok(c) => collectors.push(Box::new(c)),
        Err(e) => error!(error = %e, "error starting collector sysfs"),
    }

    info!(collectors = collectors.len(), version = intel_gpu_exporter::VERSION, "collectors started");
    let _handles = spawn_collectors(collectors);

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutting down");

    Ok(())
}
