//! Concrete load dimensions built on [`WeightedCounter`].
//!
//! Each counter owns its state exclusively. Instantaneous variants quantize
//! inside their mutator; time-windowed variants stage raw samples in an
//! atomic between driver ticks so concurrent protocol threads never lose an
//! update, then drain with `swap(0)` inside `calculate_weight` (an add that
//! races the swap lands in the next second, which is acceptable; a lost add
//! is not). The listener is always invoked after the internal lock has been
//! released.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use super::weighable::{DimensionId, SharedListener, SharedOverload, Weighable};
use super::weighted::WeightedCounter;
use super::window::SlidingWindow;

/// Instantaneous-level dimension (queue depth). `set_counter` stores the
/// observed level and recomputes immediately; never driven by the timer.
pub struct LevelCounter {
    id: DimensionId,
    inner: Mutex<LevelState>,
    listener: SharedListener,
}

struct LevelState {
    core: WeightedCounter,
    level: u64,
}

impl LevelCounter {
    pub fn new(
        id: DimensionId,
        max_allowed: u64,
        water_mark_percent: u64,
        initial_weight: u8,
        listener: SharedListener,
        overload: SharedOverload,
    ) -> Self {
        let core = WeightedCounter::new(id, max_allowed, water_mark_percent, initial_weight, overload);
        Self {
            id,
            inner: Mutex::new(LevelState { core, level: 0 }),
            listener,
        }
    }
}

impl Weighable for LevelCounter {
    fn counter_id(&self) -> DimensionId {
        self.id
    }

    fn weight(&self) -> u8 {
        lock(&self.inner).core.weight()
    }

    fn current_load(&self) -> u64 {
        lock(&self.inner).level
    }

    fn load_used_for_last_calc(&self) -> u64 {
        lock(&self.inner).core.load_used_for_last_calc()
    }

    fn current_state(&self) -> String {
        let state = lock(&self.inner);
        format!("{} level={}", state.core.describe(), state.level)
    }

    fn set_counter(&self, value: u64) {
        let changed = {
            let mut state = lock(&self.inner);
            state.level = value;
            state.core.quantize(value).changed
        };
        if changed {
            self.listener.on_weight_changed(self, value);
        }
    }
}

/// Monotonic up/down dimension (concurrent session count).
pub struct UpDownCounter {
    id: DimensionId,
    inner: Mutex<UpDownState>,
    listener: SharedListener,
}

struct UpDownState {
    core: WeightedCounter,
    count: u64,
}

impl UpDownCounter {
    pub fn new(
        id: DimensionId,
        max_allowed: u64,
        water_mark_percent: u64,
        initial_weight: u8,
        listener: SharedListener,
        overload: SharedOverload,
    ) -> Self {
        let core = WeightedCounter::new(id, max_allowed, water_mark_percent, initial_weight, overload);
        Self {
            id,
            inner: Mutex::new(UpDownState { core, count: 0 }),
            listener,
        }
    }

    fn adjust(&self, up: bool) {
        let (changed, count) = {
            let mut state = lock(&self.inner);
            state.count = if up {
                state.count.saturating_add(1)
            } else {
                state.count.saturating_sub(1)
            };
            let count = state.count;
            (state.core.quantize(count).changed, count)
        };
        if changed {
            self.listener.on_weight_changed(self, count);
        }
    }
}

impl Weighable for UpDownCounter {
    fn counter_id(&self) -> DimensionId {
        self.id
    }

    fn weight(&self) -> u8 {
        lock(&self.inner).core.weight()
    }

    fn current_load(&self) -> u64 {
        lock(&self.inner).count
    }

    fn load_used_for_last_calc(&self) -> u64 {
        lock(&self.inner).core.load_used_for_last_calc()
    }

    fn current_state(&self) -> String {
        let state = lock(&self.inner);
        format!("{} count={}", state.core.describe(), state.count)
    }

    fn increment(&self) {
        self.adjust(true);
    }

    fn decrement(&self) {
        self.adjust(false);
    }
}

/// Rate dimension (message arrivals per averaging period). `increment`
/// stages arrivals; the once-per-second driver drains them into the window.
pub struct RateCounter {
    id: DimensionId,
    staged: AtomicU64,
    inner: Mutex<WindowedState>,
    listener: SharedListener,
}

/// Peak-per-window dimension (response time). `set_counter` keeps the
/// maximum observed during the in-flight second.
pub struct PeakCounter {
    id: DimensionId,
    peak: AtomicU64,
    inner: Mutex<WindowedState>,
    listener: SharedListener,
}

struct WindowedState {
    core: WeightedCounter,
    window: SlidingWindow,
}

impl WindowedState {
    /// Drains one second's staged sample and recomputes from the window
    /// average; returns the average when the weight changed.
    fn roll(&mut self, sample: u64) -> Option<u64> {
        self.window.add_sample(sample);
        let average = self.window.average();
        if self.core.quantize(average).changed {
            Some(average)
        } else {
            None
        }
    }
}

impl RateCounter {
    pub fn new(
        id: DimensionId,
        max_allowed: u64,
        water_mark_percent: u64,
        initial_weight: u8,
        average_period_secs: u64,
        listener: SharedListener,
        overload: SharedOverload,
    ) -> Self {
        let core = WeightedCounter::new(id, max_allowed, water_mark_percent, initial_weight, overload);
        Self {
            id,
            staged: AtomicU64::new(0),
            inner: Mutex::new(WindowedState {
                core,
                window: SlidingWindow::new(average_period_secs),
            }),
            listener,
        }
    }
}

impl Weighable for RateCounter {
    fn counter_id(&self) -> DimensionId {
        self.id
    }

    fn weight(&self) -> u8 {
        lock(&self.inner).core.weight()
    }

    fn current_load(&self) -> u64 {
        self.staged.load(Ordering::Relaxed)
    }

    fn load_used_for_last_calc(&self) -> u64 {
        lock(&self.inner).core.load_used_for_last_calc()
    }

    fn current_state(&self) -> String {
        let staged = self.staged.load(Ordering::Relaxed);
        let state = lock(&self.inner);
        format!("{} staged={}", state.core.describe(), staged)
    }

    fn increment(&self) {
        self.staged.fetch_add(1, Ordering::Relaxed);
    }

    fn calculate_weight(&self) {
        let arrivals = self.staged.swap(0, Ordering::AcqRel);
        let notify = lock(&self.inner).roll(arrivals);
        if let Some(average) = notify {
            self.listener.on_weight_changed(self, average);
        }
    }
}

impl PeakCounter {
    pub fn new(
        id: DimensionId,
        max_allowed: u64,
        water_mark_percent: u64,
        initial_weight: u8,
        average_period_secs: u64,
        listener: SharedListener,
        overload: SharedOverload,
    ) -> Self {
        let core = WeightedCounter::new(id, max_allowed, water_mark_percent, initial_weight, overload);
        Self {
            id,
            peak: AtomicU64::new(0),
            inner: Mutex::new(WindowedState {
                core,
                window: SlidingWindow::new(average_period_secs),
            }),
            listener,
        }
    }
}

impl Weighable for PeakCounter {
    fn counter_id(&self) -> DimensionId {
        self.id
    }

    fn weight(&self) -> u8 {
        lock(&self.inner).core.weight()
    }

    fn current_load(&self) -> u64 {
        self.peak.load(Ordering::Relaxed)
    }

    fn load_used_for_last_calc(&self) -> u64 {
        lock(&self.inner).core.load_used_for_last_calc()
    }

    fn current_state(&self) -> String {
        let peak = self.peak.load(Ordering::Relaxed);
        let state = lock(&self.inner);
        format!("{} peak={}", state.core.describe(), peak)
    }

    fn set_counter(&self, value: u64) {
        self.peak.fetch_max(value, Ordering::Relaxed);
    }

    fn calculate_weight(&self) {
        let peak = self.peak.swap(0, Ordering::AcqRel);
        let notify = lock(&self.inner).roll(peak);
        if let Some(average) = notify {
            self.listener.on_weight_changed(self, average);
        }
    }
}

/// Removes a dimension from consideration without special-casing callers:
/// every input is ignored and the weight is permanently "fully free".
pub struct DisabledCounter {
    id: DimensionId,
}

impl DisabledCounter {
    pub fn new(id: DimensionId) -> Self {
        Self { id }
    }
}

impl Weighable for DisabledCounter {
    fn counter_id(&self) -> DimensionId {
        self.id
    }

    fn weight(&self) -> u8 {
        10
    }

    fn current_load(&self) -> u64 {
        0
    }

    fn load_used_for_last_calc(&self) -> u64 {
        0
    }

    fn current_state(&self) -> String {
        format!("dimension={} disabled", self.id)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    // counters never panic while holding the lock; recover from poison
    // rather than propagating it into protocol threads
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
