//! Error type shared by the collectors

use std::process::ExitStatus;
use thiserror::Error;

/// Result type used across the exporter
pub type Result<T> = std::result::Result<T, ExporterError>;

/// Failures of the collectors and their setup
#[derive(Debug, Error)]
pub enum ExporterError {
    /// Reading a file or the subprocess stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The sampling subprocess could not be started
    #[error("Failed to start '{command}': {source}")]
    Spawn {
        /// Executable that failed to start
        command: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// The JSON stream is structurally broken
    #[error("Malformed JSON in stream: {0}")]
    Decode(#[from] serde_json::Error),

    /// The subprocess closed its output
    #[error("Stream closed by subprocess ({})", describe_status(.status))]
    StreamClosed {
        /// Exit status of the reaped subprocess, if any
        status: Option<ExitStatus>,
    },

    /// A snapshot period with an unknown unit or an unusable value
    #[error("Invalid duration {value}{unit}")]
    InvalidDuration {
        /// Raw duration value
        value: f64,
        /// Raw unit suffix
        unit: String,
    },

    /// A sampled quantity reported in a unit other than the expected one
    #[error("Unexpected unit for {quantity}: {unit}")]
    UnexpectedUnit {
        /// What was sampled
        quantity: String,
        /// Unit found in the sample
        unit: String,
    },

    /// A sampled quantity that is negative or not finite
    #[error("Invalid value for {quantity}: {value}")]
    InvalidValue {
        /// What was sampled
        quantity: String,
        /// Value found in the sample
        value: f64,
    },

    /// A known key of the frequency file with an unparseable value
    #[error("Malformed value for '{key}': '{value}'")]
    MalformedFrequency {
        /// Key of the offending line
        key: String,
        /// Value of the offending line
        value: String,
    },

    /// The calibration range does not yield a usable bucket layout
    #[error("Invalid histogram buckets: idle {idle} Hz, max {max} Hz, step {step} Hz")]
    InvalidBuckets {
        /// Idle frequency in Hz
        idle: f64,
        /// Maximum frequency in Hz
        max: f64,
        /// Bucket width in Hz
        step: f64,
    },

    /// Registering or building a metric failed
    #[error("Metrics registry error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// A collector task panicked or was cancelled
    #[error("Collector task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A configuration value is out of range
    #[error("Configuration error for {parameter}: {message}")]
    ConfigurationError {
        /// Explanation of the problem
        message: String,
        /// Path of the offending parameter
        parameter: String,
    },
}

fn describe_status(status: &Option<ExitStatus>) -> String {
    match status {
        Some(status) => status.to_string(),
        None => "exit status unknown".to_string(),
    }
}

/// Extension trait for error handling utilities
pub(crate) trait ErrorExt {
    /// Whether the error only affects a single sample and collection can go on
    fn is_recoverable(&self) -> bool;
}

impl ErrorExt for ExporterError {
    fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExporterError::InvalidDuration { .. }
                | ExporterError::UnexpectedUnit { .. }
                | ExporterError::InvalidValue { .. }
                | ExporterError::MalformedFrequency { .. }
        )
    }
}
