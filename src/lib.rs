//! Intel GPU exporter - Prometheus collectors for Intel integrated GPUs
//!
//! Two collectors feed a [`prometheus::Registry`]:
//! - [`GpuTopCollector`] reads the JSON stream of `intel_gpu_top` and turns it
//!   into power (Wh) and per-engine busy/sema/wait (seconds) counters.
//! - [`FrequencyCollector`] polls the i915 debugfs frequency file into a
//!   histogram calibrated from the idle/max frequency at startup.

#![warn(missing_docs)]

// Public modules
pub mod collector;
pub mod config;
pub mod error;
pub mod gpu_top;
pub mod sysfs;
pub mod utils;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-exports for public API
pub use collector::{spawn_collectors, Collector};
pub use config::ExporterConfig;
pub use error::{ExporterError, Result};
pub use gpu_top::{GpuTopCollector, JsonStream, Snapshot};
pub use sysfs::{FrequencyCollector, FrequencySample};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_numbers() {
        assert!(!VERSION.is_empty());
    }
}
