//! Conversion of sampled quantities carrying a unit suffix

use std::time::Duration;

use crate::error::{ExporterError, Result};

/// Seconds per unit for the time suffixes the sampler can emit
fn seconds_per_unit(unit: &str) -> Option<f64> {
    match unit {
        "ns" => Some(1e-9),
        "us" | "µs" | "μs" => Some(1e-6),
        "ms" => Some(1e-3),
        "s" => Some(1.0),
        "m" => Some(60.0),
        "h" => Some(3600.0),
        _ => None,
    }
}

/// Parse a `(value, unit)` pair such as `(500.0, "ms")` into a duration.
///
/// Fails with [`ExporterError::InvalidDuration`] for unknown units and for
/// values that are negative, not finite, or too large to represent.
pub fn parse_period(value: f64, unit: &str) -> Result<Duration> {
    let invalid = || ExporterError::InvalidDuration {
        value,
        unit: unit.to_string(),
    };

    let scale = seconds_per_unit(unit).ok_or_else(invalid)?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }

    Duration::try_from_secs_f64(value * scale).map_err(|_| invalid())
}

/// Convert a duration to fractional hours
pub fn as_hours(duration: Duration) -> f64 {
    duration.as_secs_f64() / 3600.0
}
