use std::sync::Once;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    fmt::{self as fmt_subscriber, time::UtcTime},
    EnvFilter,
};

use crate::config::LoggingConfig;
use crate::error::{ExporterError, Result};

static INIT: Once = Once::new();

/// Initialize logging system
///
/// Only the first call installs a subscriber; later calls are no-ops.
pub fn setup_logging(config: &LoggingConfig) -> Result<()> {
    let mut result = Ok(());

    INIT.call_once(|| {
        result = setup_logging_internal(config);
    });

    result
}

fn setup_logging_internal(config: &LoggingConfig) -> Result<()> {
    let level = LevelFilter::from_level(config.level.into());
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let builder = fmt_subscriber::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    let installed = if config.timestamps {
        builder.with_timer(UtcTime::rfc_3339()).try_init()
    } else {
        builder.without_time().try_init()
    };

    installed.map_err(|e| ExporterError::ConfigurationError {
        message: format!("Failed to set global subscriber: {}", e),
        parameter: "logging".to_string(),
    })
}
