//! Utility functions for logging and unit conversion

mod logging;
mod units;

pub use logging::setup_logging;
pub use units::{as_hours, parse_period};
