//! Common contract for load counters and the notification protocol through
//! which a counter reports weight changes to the node's aggregator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One independently tracked source of load on the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DimensionId {
    QueueDepth,
    Sessions,
    MessageRate,
    ResponseTime,
}

impl DimensionId {
    pub fn as_str(self) -> &'static str {
        match self {
            DimensionId::QueueDepth => "queueDepth",
            DimensionId::Sessions => "sessions",
            DimensionId::MessageRate => "messageRate",
            DimensionId::ResponseTime => "responseTime",
        }
    }
}

impl fmt::Display for DimensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A load counter producing a normalized 0-10 weight (10 = fully free,
/// 0 = fully loaded).
///
/// Protocol threads call the mutators as traffic occurs; a single periodic
/// driver calls [`calculate_weight`](Weighable::calculate_weight) once per
/// second on time-windowed counters. Operations a given variant does not
/// support are no-ops, never errors, so callers hold a single `Weighable`
/// reference regardless of dimension.
pub trait Weighable: Send + Sync {
    fn counter_id(&self) -> DimensionId;

    /// Current weight, always in 0..=10.
    fn weight(&self) -> u8;

    /// Instantaneous raw load (staged count, level, session count or
    /// in-flight peak depending on the variant).
    fn current_load(&self) -> u64;

    /// The raw load value that produced the current weight, for diagnostics.
    fn load_used_for_last_calc(&self) -> u64;

    /// Human-readable diagnostic dump.
    fn current_state(&self) -> String;

    fn increment(&self) {}

    fn decrement(&self) {}

    fn set_counter(&self, _value: u64) {}

    /// Periodic recomputation hook; drains per-second staging state on
    /// time-windowed variants and is a no-op everywhere else.
    fn calculate_weight(&self) {}
}

/// Receives weight-change notifications.
///
/// Invoked synchronously on the mutating thread, at most once per mutating
/// call, and only when the quantized weight actually changed. A slow
/// implementation stalls the protocol or driver thread that triggered the
/// change; keep it minimal or hand off to a queue.
pub trait WeightListener: Send + Sync {
    fn on_weight_changed(&self, counter: &dyn Weighable, current_load: u64);
}

/// Level-triggered sustained-overload signal, fired from the quantizer when
/// raw load runs more than 20% past the configured maximum. Injected at
/// construction; what to do about overload is the aggregator's decision.
///
/// Fired from inside the counter's mutation path, so implementations must
/// not call back into the originating counter.
pub trait OverloadSignal: Send + Sync {
    fn overloaded(&self, id: DimensionId, current_load: u64);
}

/// Listener that drops every notification; useful when a dimension is
/// tracked purely for its diagnostic dump.
pub struct NoopListener;

impl WeightListener for NoopListener {
    fn on_weight_changed(&self, _counter: &dyn Weighable, _current_load: u64) {}
}

impl OverloadSignal for NoopListener {
    fn overloaded(&self, _id: DimensionId, _current_load: u64) {}
}

pub type SharedListener = Arc<dyn WeightListener>;
pub type SharedOverload = Arc<dyn OverloadSignal>;
