//! Supplied load-reporting parameters.
//!
//! The node's configuration layer hands these values to the monitor at
//! feature activation; this crate never re-reads them afterward. Degenerate
//! numeric values are coerced during counter construction rather than
//! rejected, since the calling protocol paths cannot tolerate propagated
//! failures.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DimensionCfg {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Raw load mapping to full overload; values below 10 are coerced up.
    #[serde(default = "default_max_allowed")]
    pub max_allowed: u64,
    /// Hysteresis margin as a percentage of one weight step, applied only
    /// when load decreases.
    #[serde(default = "default_water_mark_percent")]
    pub water_mark_percent: u64,
    /// Weight advertised before the first recomputation, 0..=10.
    #[serde(default = "default_initial_weight")]
    pub initial_weight: u8,
    /// Averaging period for time-windowed dimensions; values under 1000 ms
    /// are coerced to one-second granularity.
    #[serde(default = "default_average_period_millis")]
    pub average_period_millis: u64,
}

impl DimensionCfg {
    pub fn average_period_secs(&self) -> u64 {
        (self.average_period_millis / 1000).max(1)
    }
}

impl Default for DimensionCfg {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            max_allowed: default_max_allowed(),
            water_mark_percent: default_water_mark_percent(),
            initial_weight: default_initial_weight(),
            average_period_millis: default_average_period_millis(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoadCfg {
    #[serde(default)]
    pub queue_depth: DimensionCfg,
    #[serde(default)]
    pub sessions: DimensionCfg,
    #[serde(default)]
    pub message_rate: DimensionCfg,
    #[serde(default)]
    pub response_time: DimensionCfg,
}

fn default_true() -> bool {
    true
}

pub fn default_max_allowed() -> u64 {
    1000
}

pub fn default_water_mark_percent() -> u64 {
    20
}

pub fn default_initial_weight() -> u8 {
    10
}

pub fn default_average_period_millis() -> u64 {
    1000
}
