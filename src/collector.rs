//! Collector lifecycle shared by every telemetry source

use tokio::task::JoinHandle;
use tracing::{error, info, info_span, Instrument};

use crate::error::Result;

/// An independently scheduled source of metric updates.
///
/// Metrics are registered when the collector is constructed; `run` only
/// updates them.
#[async_trait::async_trait]
pub trait Collector: Send + Sync {
    /// Logical name used in logs
    fn name(&self) -> &'static str;

    /// Start sampling.
    ///
    /// Returns once the collector has stopped, or right after scheduling
    /// when sampling happens in the background.
    async fn run(&self) -> Result<()>;
}

/// Run every collector on its own task.
///
/// A collector that fails is logged and left stopped; the others keep going.
pub fn spawn_collectors(collectors: Vec<Box<dyn Collector>>) -> Vec<JoinHandle<()>> {
    collectors
        .into_iter()
        .map(|collector| {
            let span = info_span!("collector", collector = collector.name());
            tokio::spawn(
                async move {
                    info!("starting collector");
                    if let Err(e) = collector.run().await {
                        error!(error = %e, "error running collector {}", collector.name());
                    }
                }
                .instrument(span),
            )
        })
        .collect()
}
