//! Stair-step weight quantization with asymmetric hysteresis.
//!
//! Raw load divides into eleven stairs (0 = unloaded .. 10 = overloaded);
//! the externally visible weight is always `10 - stair`. Rising load crosses
//! a stair boundary immediately, since briefly under-reporting capacity is
//! safe. Falling load must drop at least the watermark below the boundary
//! before a lower stair is accepted, which keeps the advertised weight from
//! flapping when load hovers near a boundary.

use super::weighable::{DimensionId, SharedOverload};

/// Result of one quantization pass.
#[derive(Debug, Clone, Copy)]
pub struct QuantizeOutcome {
    pub changed: bool,
}

pub struct WeightedCounter {
    id: DimensionId,
    max_allowed: u64,
    step_size: u64,
    water_mark: u64,
    last_stair: u8,
    load_used: u64,
    overload: SharedOverload,
}

impl WeightedCounter {
    /// `max_allowed` below 10 is coerced up to 10 (fewer than ten steps
    /// cannot be evenly quantized); `water_mark_percent` is clamped to
    /// 0..=100 and `initial_weight` to 0..=10.
    pub fn new(
        id: DimensionId,
        max_allowed: u64,
        water_mark_percent: u64,
        initial_weight: u8,
        overload: SharedOverload,
    ) -> Self {
        let max_allowed = max_allowed.max(10);
        let step_size = max_allowed / 10;
        let water_mark = step_size * water_mark_percent.min(100) / 100;
        let last_stair = 10 - initial_weight.min(10);
        Self {
            id,
            max_allowed,
            step_size,
            water_mark,
            last_stair,
            load_used: 0,
            overload,
        }
    }

    /// Maps `current_load` onto a stair and records it when it differs from
    /// the previous one. Signals sustained overload when load runs more than
    /// 20% past the configured maximum.
    pub fn quantize(&mut self, current_load: u64) -> QuantizeOutcome {
        let mut candidate = (current_load / self.step_size).min(u8::MAX as u64) as u8;
        if candidate > 10 {
            if candidate > 11 {
                tracing::warn!(
                    target: "load",
                    dimension = %self.id,
                    load = current_load,
                    max_allowed = self.max_allowed,
                    "sustained overload: load more than 20% past configured maximum"
                );
                self.overload.overloaded(self.id, current_load);
            }
            candidate = 10;
        } else if candidate < self.last_stair {
            // load looks lower, but only accept the drop once it clears the
            // watermark below the stair boundary
            let threshold = candidate as u64 * self.step_size + self.water_mark;
            if current_load > threshold {
                candidate += 1;
            }
        }

        if candidate != self.last_stair {
            tracing::debug!(
                target: "load",
                dimension = %self.id,
                stair = candidate,
                previous = self.last_stair,
                load = current_load,
                "load stair changed"
            );
            self.last_stair = candidate;
            self.load_used = current_load;
            QuantizeOutcome { changed: true }
        } else {
            QuantizeOutcome { changed: false }
        }
    }

    pub fn weight(&self) -> u8 {
        10 - self.last_stair
    }

    pub fn load_used_for_last_calc(&self) -> u64 {
        self.load_used
    }

    pub fn describe(&self) -> String {
        format!(
            "dimension={} weight={} stair={} loadUsed={} maxAllowed={} step={} waterMark={}",
            self.id,
            self.weight(),
            self.last_stair,
            self.load_used,
            self.max_allowed,
            self.step_size,
            self.water_mark,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::load::weighable::OverloadSignal;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingOverload {
        fired: AtomicU64,
    }

    impl OverloadSignal for CountingOverload {
        fn overloaded(&self, _id: DimensionId, _current_load: u64) {
            self.fired.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn counter_with(max_allowed: u64, water_mark_percent: u64) -> (WeightedCounter, Arc<CountingOverload>) {
        let overload = Arc::new(CountingOverload::default());
        let counter = WeightedCounter::new(
            DimensionId::Sessions,
            max_allowed,
            water_mark_percent,
            10,
            overload.clone(),
        );
        (counter, overload)
    }

    #[test]
    fn rising_load_crosses_stairs_immediately() {
        // step 100, watermark 10
        let (mut counter, _) = counter_with(1000, 10);
        assert!(counter.quantize(250).changed);
        assert_eq!(counter.weight(), 8);
        // stair 2 -> 3 with no hysteresis on the way up
        assert!(counter.quantize(350).changed);
        assert_eq!(counter.weight(), 7);
    }

    #[test]
    fn falling_load_blocked_inside_watermark() {
        let (mut counter, _) = counter_with(1000, 10);
        counter.quantize(350);
        assert_eq!(counter.weight(), 7);
        // candidate 2, threshold 2*100+10=210; 215 > 210 keeps stair 3
        assert!(!counter.quantize(215).changed);
        assert_eq!(counter.weight(), 7);
        // 205 <= 210 accepts the lower stair
        assert!(counter.quantize(205).changed);
        assert_eq!(counter.weight(), 8);
    }

    #[test]
    fn candidate_above_ten_clamps_to_full_load() {
        let (mut counter, overload) = counter_with(100, 10);
        // candidate 11: clamped, not yet signaled as sustained overload
        assert!(counter.quantize(115).changed);
        assert_eq!(counter.weight(), 0);
        assert_eq!(overload.fired.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn sustained_overload_signaled_past_twenty_percent() {
        let (mut counter, overload) = counter_with(100, 10);
        counter.quantize(125);
        assert_eq!(counter.weight(), 0);
        assert_eq!(overload.fired.load(Ordering::Relaxed), 1);
        // level-triggered: fires again while load stays past the bound
        counter.quantize(130);
        assert_eq!(overload.fired.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn unchanged_stair_reports_no_change() {
        let (mut counter, _) = counter_with(1000, 10);
        assert!(counter.quantize(250).changed);
        assert!(!counter.quantize(260).changed);
        assert!(!counter.quantize(299).changed);
    }

    #[test]
    fn sub_ten_max_allowed_coerced_up() {
        let (mut counter, _) = counter_with(3, 10);
        // step becomes 1; load 5 lands on stair 5
        counter.quantize(5);
        assert_eq!(counter.weight(), 5);
    }

    #[test]
    fn initial_weight_seeds_starting_stair() {
        let overload = Arc::new(CountingOverload::default());
        let counter =
            WeightedCounter::new(DimensionId::QueueDepth, 1000, 10, 7, overload);
        assert_eq!(counter.weight(), 7);
    }

    #[test]
    fn load_used_tracks_last_stair_change() {
        let (mut counter, _) = counter_with(1000, 10);
        counter.quantize(250);
        assert_eq!(counter.load_used_for_last_calc(), 250);
        // no stair change, load_used stays
        counter.quantize(260);
        assert_eq!(counter.load_used_for_last_calc(), 250);
    }

    #[test]
    fn hysteresis_steps_down_one_stair_at_a_time_when_blocked() {
        let (mut counter, _) = counter_with(1000, 10);
        counter.quantize(950);
        assert_eq!(counter.weight(), 1);
        // candidate 1, threshold 110; 115 > 110 bumps candidate to 2 only
        assert!(counter.quantize(115).changed);
        assert_eq!(counter.weight(), 8);
    }
}
