use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};

use prometheus::{Counter, CounterVec, Opts, Registry};
use tracing::{debug, error, warn, Span};

use crate::{
    collector::Collector,
    config::GpuTopConfig,
    error::{ErrorExt, ExporterError, Result},
    utils::{as_hours, parse_period},
};

use super::stream::JsonStream;
use super::types::Snapshot;

/// Label values of the `mode` dimension of `gpu_engine_seconds_total`
pub const ENGINE_MODES: [&str; 3] = ["busy", "sema", "wait"];

/// Counters only move forward, so every sampled value must be a finite,
/// non-negative number
fn check_value(quantity: impl FnOnce() -> String, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ExporterError::InvalidValue {
            quantity: quantity(),
            value,
        })
    }
}

/// Metric handles fed from `intel_gpu_top` snapshots
#[derive(Clone)]
pub struct GpuTopMetrics {
    power_consumption: Counter,
    engine_usage: CounterVec,
}

impl GpuTopMetrics {
    /// Register the power and engine counters in `registry`
    pub fn register(registry: &Registry) -> Result<Self> {
        let power_consumption = Counter::with_opts(Opts::new(
            "gpu_power_consumption_total",
            "Aggregated power usage in Wh.",
        ))?;
        let engine_usage = CounterVec::new(
            Opts::new("gpu_engine_seconds_total", "Usage of GPU engines in seconds."),
            &["engine", "mode"],
        )?;

        registry.register(Box::new(power_consumption.clone()))?;
        registry.register(Box::new(engine_usage.clone()))?;

        Ok(Self {
            power_consumption,
            engine_usage,
        })
    }

    /// Turn one snapshot into counter increments.
    ///
    /// Units and values are checked for the whole snapshot before any counter
    /// moves, so an error leaves every metric as it was.
    pub fn record(&self, snapshot: &Snapshot) -> Result<()> {
        let period = parse_period(snapshot.period.duration, &snapshot.period.unit)?;

        if snapshot.power.unit != "W" {
            return Err(ExporterError::UnexpectedUnit {
                quantity: "power consumption".to_string(),
                unit: snapshot.power.unit.clone(),
            });
        }

        check_value(|| "power consumption".to_string(), snapshot.power.value)?;

        for (engine, values) in &snapshot.engines {
            if values.unit != "%" {
                return Err(ExporterError::UnexpectedUnit {
                    quantity: format!("engine {}", engine),
                    unit: values.unit.clone(),
                });
            }
            for (mode, percent) in ENGINE_MODES.into_iter().zip([values.busy, values.sema, values.wait]) {
                check_value(|| format!("engine {} {}", engine, mode), percent)?;
            }
        }

        self.power_consumption
            .inc_by(as_hours(period) * snapshot.power.value);

        let seconds = period.as_secs_f64();
        for (engine, values) in &snapshot.engines {
            let engine = engine.to_lowercase();
            for (mode, percent) in ENGINE_MODES.into_iter().zip([values.busy, values.sema, values.wait]) {
                self.engine_usage
                    .with_label_values(&[engine.as_str(), mode])
                    .inc_by(seconds * percent * 0.01);
            }
        }

        Ok(())
    }

    /// Decode snapshots from `reader` and record them until the stream ends.
    ///
    /// Returns the number of snapshots decoded. Snapshots that fail to
    /// record are logged and skipped; a decode or read error ends the loop.
    pub fn consume<R: BufRead>(&self, reader: R) -> Result<usize> {
        let mut decoded = 0;

        for snapshot in JsonStream::<R, Snapshot>::new(reader) {
            let snapshot = snapshot?;
            decoded += 1;

            if let Err(e) = self.record(&snapshot) {
                if !e.is_recoverable() {
                    return Err(e);
                }
                let output = serde_json::to_string(&snapshot).unwrap_or_default();
                error!(output = %output, error = %e, "unable to process intel_gpu_top output");
            }
        }

        Ok(decoded)
    }

    /// Accumulated power consumption in Wh
    pub fn power_consumption(&self) -> f64 {
        self.power_consumption.get()
    }

    /// Accumulated seconds `engine` spent in `mode`
    pub fn engine_seconds(&self, engine: &str, mode: &str) -> f64 {
        self.engine_usage.with_label_values(&[engine, mode]).get()
    }
}

/// Collector owning an `intel_gpu_top` subprocess and its JSON stream
pub struct GpuTopCollector {
    config: GpuTopConfig,
    metrics: GpuTopMetrics,
}

impl GpuTopCollector {
    /// Register the collector's metrics; the subprocess starts in `run`
    pub fn new(registry: &Registry, config: GpuTopConfig) -> Result<Self> {
        Ok(Self {
            metrics: GpuTopMetrics::register(registry)?,
            config,
        })
    }

    /// Handles of the registered metrics
    pub fn metrics(&self) -> &GpuTopMetrics {
        &self.metrics
    }
}

#[async_trait::async_trait]
impl Collector for GpuTopCollector {
    fn name(&self) -> &'static str {
        "gputop"
    }

    async fn run(&self) -> Result<()> {
        let mut child = Command::new(&self.config.command)
            .args(&self.config.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ExporterError::Spawn {
                command: self.config.command.clone(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or_else(|| ExporterError::Spawn {
            command: self.config.command.clone(),
            source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout not captured"),
        })?;

        debug!(pid = child.id(), command = %self.config.command, "started subprocess");

        let metrics = self.metrics.clone();
        let span = Span::current();
        let consumed = tokio::task::spawn_blocking(move || {
            let _guard = span.enter();
            metrics.consume(BufReader::new(stdout))
        })
        .await;

        if let Err(e) = child.kill() {
            debug!(error = %e, "subprocess already exited");
        }
        let status = child.wait().ok();

        match consumed? {
            Ok(decoded) => {
                warn!(decoded, "intel_gpu_top stream ended");
                Err(ExporterError::StreamClosed { status })
            }
            Err(e) => Err(e),
        }
    }
}
