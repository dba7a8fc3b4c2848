// Location: src/config.rs

//! Collector, subprocess and logging settings

use std::path::PathBuf;
use std::time::Duration;
use serde::{Serialize, Deserialize};

use crate::error::{ExporterError, Result};

/// Debugfs file exposing the i915 frequency state
pub const FREQUENCY_INFO_PATH: &str = "/sys/kernel/debug/dri/0/i915_frequency_info";

/// Settings of the whole exporter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// `intel_gpu_top` stream collector
    pub gpu_top: GpuTopConfig,
    /// Polled frequency collector
    pub frequency: FrequencyConfig,
    /// Log output
    pub logging: LoggingConfig,
}

/// Subprocess invocation of the stream collector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpuTopConfig {
    /// Executable emitting the JSON snapshot stream
    pub command: String,

    /// Arguments passed to the executable
    pub args: Vec<String>,
}

/// File and cadence of the frequency collector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyConfig {
    /// Path of the frequency info file
    pub path: PathBuf,

    /// Interval between two reads of the file
    pub poll_interval: Duration,

    /// Width of a histogram bucket in Hz
    pub bucket_step_hz: f64,
}

/// Tracing subscriber settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level, overridden by `RUST_LOG`
    pub level: LogLevel,

    /// Whether to include timestamps
    pub timestamps: bool,

    /// Whether to include source code locations
    pub source_location: bool,
}

/// Minimum severity of emitted log events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// Failures only
    Error,
    /// Recoverable problems, such as a skipped snapshot
    Warn,
    /// Collector lifecycle
    Info,
    /// Per-sample details
    Debug,
    /// Everything
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl Default for GpuTopConfig {
    fn default() -> Self {
        Self {
            command: "intel_gpu_top".to_string(),
            args: vec!["-J".to_string(), "-o".to_string(), "-".to_string()],
        }
    }
}

impl Default for FrequencyConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(FREQUENCY_INFO_PATH),
            poll_interval: Duration::from_millis(500),
            bucket_step_hz: 50e6,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            timestamps: true,
            source_location: false,
        }
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            gpu_top: GpuTopConfig::default(),
            frequency: FrequencyConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ExporterConfig {
    /// Reject values the collectors cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.gpu_top.command.trim().is_empty() {
            return Err(ExporterError::ConfigurationError {
                message: "Command cannot be empty".to_string(),
                parameter: "gpu_top.command".to_string(),
            });
        }

        if self.frequency.path.as_os_str().is_empty() {
            return Err(ExporterError::ConfigurationError {
                message: "Frequency info path cannot be empty".to_string(),
                parameter: "frequency.path".to_string(),
            });
        }

        if self.frequency.poll_interval.is_zero() {
            return Err(ExporterError::ConfigurationError {
                message: "Poll interval must be greater than zero".to_string(),
                parameter: "frequency.poll_interval".to_string(),
            });
        }

        let step = self.frequency.bucket_step_hz;
        if !step.is_finite() || step <= 0.0 {
            return Err(ExporterError::ConfigurationError {
                message: format!("Bucket step must be a positive number of Hz, got {}", step),
                parameter: "frequency.bucket_step_hz".to_string(),
            });
        }

        Ok(())
    }
}
