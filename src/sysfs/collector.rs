use std::path::PathBuf;
use std::time::Duration;

use prometheus::{Histogram, HistogramOpts, Registry};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, Instrument, Span};

use crate::{
    collector::Collector,
    config::FrequencyConfig,
    error::Result,
};

use super::parser::{read_frequency_info, read_frequency_info_async};

/// Collector sampling the GPU frequency from the i915 debugfs file
pub struct FrequencyCollector {
    path: PathBuf,
    poll_interval: Duration,
    frequency: Histogram,
}

impl FrequencyCollector {
    /// Read the file once to size the histogram buckets, then register it.
    ///
    /// Nothing is registered if the read fails or the reported range does
    /// not yield at least one bucket.
    pub fn new(registry: &Registry, config: &FrequencyConfig) -> Result<Self> {
        let calibration = read_frequency_info(&config.path)?;
        let buckets = calibration.buckets(config.bucket_step_hz)?;
        debug!(
            idle_hz = calibration.idle,
            max_hz = calibration.max,
            buckets = buckets.len(),
            "calibrated frequency histogram"
        );

        let frequency = Histogram::with_opts(
            HistogramOpts::new("gpu_frequency", "GPU frequency in Hz").buckets(buckets),
        )?;
        registry.register(Box::new(frequency.clone()))?;

        Ok(Self {
            path: config.path.clone(),
            poll_interval: config.poll_interval,
            frequency,
        })
    }

    /// Handle of the registered histogram
    pub fn histogram(&self) -> &Histogram {
        &self.frequency
    }
}

#[async_trait::async_trait]
impl Collector for FrequencyCollector {
    fn name(&self) -> &'static str {
        "sysfs"
    }

    /// Schedule the periodic reads and return immediately.
    ///
    /// Ticks run one after another for the rest of the process lifetime;
    /// a failed read is logged and the tick skipped.
    async fn run(&self) -> Result<()> {
        let path = self.path.clone();
        let frequency = self.frequency.clone();
        let mut ticker = time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tokio::spawn(
            async move {
                loop {
                    ticker.tick().await;
                    match read_frequency_info_async(&path).await {
                        Ok(sample) => frequency.observe(sample.actual),
                        Err(e) => error!(error = %e, path = %path.display(), "error reading frequency"),
                    }
                }
            }
            .instrument(Span::current()),
        );

        Ok(())
    }
}
