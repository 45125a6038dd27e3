//! Bridges counter notifications onto the structured event bus.

use std::sync::Arc;

use crate::events::structured::{EventBus, LoadEvent};

use super::weighable::{DimensionId, OverloadSignal, Weighable, WeightListener};

/// Default aggregator-side adapter: turns weight changes and overload
/// signals into [`LoadEvent`]s. Callers with their own transport can supply
/// a different listener instead.
pub struct BusNotifier {
    bus: Arc<dyn EventBus>,
}

impl BusNotifier {
    pub fn new(bus: Arc<dyn EventBus>) -> Self {
        Self { bus }
    }
}

impl WeightListener for BusNotifier {
    fn on_weight_changed(&self, counter: &dyn Weighable, current_load: u64) {
        let dimension = counter.counter_id();
        let weight = counter.weight();
        tracing::debug!(
            target: "load",
            dimension = %dimension,
            weight,
            load = current_load,
            "weight changed"
        );
        self.bus.publish(LoadEvent::WeightChanged {
            dimension,
            weight,
            load: current_load,
        });
    }
}

impl OverloadSignal for BusNotifier {
    fn overloaded(&self, id: DimensionId, current_load: u64) {
        self.bus.publish(LoadEvent::Overloaded {
            dimension: id,
            load: current_load,
        });
    }
}
