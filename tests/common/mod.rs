use std::sync::Mutex;

use loadgauge::core::load::{DimensionId, OverloadSignal, Weighable, WeightListener};

/// Captures every notification a counter emits, for assertion.
#[derive(Default)]
pub struct RecordingListener {
    changes: Mutex<Vec<(DimensionId, u64, u8)>>,
    overloads: Mutex<Vec<(DimensionId, u64)>>,
}

impl RecordingListener {
    pub fn changes(&self) -> Vec<(DimensionId, u64, u8)> {
        self.changes.lock().unwrap().clone()
    }

    pub fn overloads(&self) -> Vec<(DimensionId, u64)> {
        self.overloads.lock().unwrap().clone()
    }

    pub fn change_count(&self) -> usize {
        self.changes.lock().unwrap().len()
    }
}

impl WeightListener for RecordingListener {
    fn on_weight_changed(&self, counter: &dyn Weighable, current_load: u64) {
        self.changes
            .lock()
            .unwrap()
            .push((counter.counter_id(), current_load, counter.weight()));
    }
}

impl OverloadSignal for RecordingListener {
    fn overloaded(&self, id: DimensionId, current_load: u64) {
        self.overloads.lock().unwrap().push((id, current_load));
    }
}
