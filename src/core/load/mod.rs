//! Load-weight computation engine.
//!
//! Converts independent load dimensions (queue depth, concurrent sessions,
//! message arrival rate, response latency) into normalized 0-10 weights via
//! stair-step quantization with asymmetric hysteresis, and notifies a
//! listener whenever a dimension's weight changes.

pub mod bridge;
pub mod counters;
pub mod monitor;
pub mod weighable;
pub mod weighted;
pub mod window;

pub use bridge::BusNotifier;
pub use counters::{DisabledCounter, LevelCounter, PeakCounter, RateCounter, UpDownCounter};
pub use monitor::LoadMonitor;
pub use weighable::{
    DimensionId, NoopListener, OverloadSignal, SharedListener, SharedOverload, Weighable,
    WeightListener,
};
pub use weighted::{QuantizeOutcome, WeightedCounter};
pub use window::SlidingWindow;
