//! Power and engine usage from the `intel_gpu_top` JSON stream

mod collector;
mod stream;
mod types;

pub use collector::{GpuTopCollector, GpuTopMetrics, ENGINE_MODES};
pub use stream::JsonStream;
pub use types::{Engine, Frequency, Interrupts, Period, Power, Rc6, Snapshot};
