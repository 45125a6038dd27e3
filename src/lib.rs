pub mod core;
pub mod events;
pub mod logging;

pub use crate::core::load::{
    DimensionId, LoadMonitor, OverloadSignal, Weighable, WeightListener,
};
