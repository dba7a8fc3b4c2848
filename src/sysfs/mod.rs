//! GPU frequency from the i915 debugfs frequency file

mod collector;
mod parser;

pub use collector::FrequencyCollector;
pub use parser::{parse_frequency_info, read_frequency_info, read_frequency_info_async, FrequencySample};
