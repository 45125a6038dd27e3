//! Sliding window of per-second samples with an incremental running sum.
//!
//! Time-windowed counters push one sample per driver tick and read a load
//! estimate scaled to the configured averaging period. The window holds at
//! least ten cells; when the averaging period is shorter than the window the
//! estimate is projected from the samples seen so far, once the period
//! exceeds ten seconds the window grows to match it exactly and no
//! projection is needed. Integer division truncates throughout, which
//! slightly under-reports load rather than over-reporting it.

#[derive(Debug)]
pub struct SlidingWindow {
    cells: Vec<u64>,
    write_index: usize,
    full: bool,
    running_sum: u64,
    average_period_secs: u64,
}

impl SlidingWindow {
    /// `average_period_secs` below one second is coerced to one second.
    pub fn new(average_period_secs: u64) -> Self {
        let period = average_period_secs.max(1);
        let size = period.max(10) as usize;
        Self {
            cells: vec![0; size],
            write_index: 0,
            full: false,
            running_sum: 0,
            average_period_secs: period,
        }
    }

    /// Records one second's value, evicting the oldest cell from the sum.
    pub fn add_sample(&mut self, value: u64) {
        self.running_sum = self.running_sum - self.cells[self.write_index] + value;
        self.cells[self.write_index] = value;
        self.write_index += 1;
        if self.write_index == self.cells.len() {
            self.write_index = 0;
            self.full = true;
        }
    }

    /// Load estimate scaled to the averaging period.
    pub fn average(&self) -> u64 {
        let size = self.cells.len() as u64;
        if !self.full {
            let samples = self.write_index as u64;
            // enough samples to project a rate onto the full period
            if self.average_period_secs < size && samples >= self.average_period_secs {
                (self.running_sum / samples) * self.average_period_secs
            } else {
                self.running_sum
            }
        } else if size > 10 {
            // the window itself is the averaging period
            self.running_sum
        } else {
            (self.running_sum / size) * self.average_period_secs
        }
    }

    pub fn average_period_secs(&self) -> u64 {
        self.average_period_secs
    }
}
