//! Node-side load-reporting facility.
//!
//! Owns one counter per dimension for the lifetime of the node. Protocol
//! code fetches counters by dimension and fires mutators as traffic occurs;
//! the host's once-per-second scheduler calls [`LoadMonitor::tick`], which
//! drives only the time-windowed counters. How the resulting per-dimension
//! weights combine into the single externally advertised number is the
//! aggregator's contract, not this crate's.

use dashmap::DashMap;
use std::sync::Arc;

use crate::core::config::model::{DimensionCfg, LoadCfg};

use super::counters::{DisabledCounter, LevelCounter, PeakCounter, RateCounter, UpDownCounter};
use super::weighable::{DimensionId, SharedListener, SharedOverload, Weighable};

pub struct LoadMonitor {
    counters: DashMap<DimensionId, Arc<dyn Weighable>>,
    windowed: Vec<Arc<dyn Weighable>>,
}

impl LoadMonitor {
    pub fn new(cfg: &LoadCfg, listener: SharedListener, overload: SharedOverload) -> Self {
        let queue_depth: Arc<dyn Weighable> = if cfg.queue_depth.enabled {
            Arc::new(build_level(
                DimensionId::QueueDepth,
                &cfg.queue_depth,
                listener.clone(),
                overload.clone(),
            ))
        } else {
            Arc::new(DisabledCounter::new(DimensionId::QueueDepth))
        };

        let sessions: Arc<dyn Weighable> = if cfg.sessions.enabled {
            Arc::new(build_updown(
                DimensionId::Sessions,
                &cfg.sessions,
                listener.clone(),
                overload.clone(),
            ))
        } else {
            Arc::new(DisabledCounter::new(DimensionId::Sessions))
        };

        let mut windowed: Vec<Arc<dyn Weighable>> = Vec::new();

        let message_rate: Arc<dyn Weighable> = if cfg.message_rate.enabled {
            let counter: Arc<dyn Weighable> = Arc::new(build_rate(
                DimensionId::MessageRate,
                &cfg.message_rate,
                listener.clone(),
                overload.clone(),
            ));
            windowed.push(counter.clone());
            counter
        } else {
            Arc::new(DisabledCounter::new(DimensionId::MessageRate))
        };

        let response_time: Arc<dyn Weighable> = if cfg.response_time.enabled {
            let counter: Arc<dyn Weighable> = Arc::new(build_peak(
                DimensionId::ResponseTime,
                &cfg.response_time,
                listener,
                overload,
            ));
            windowed.push(counter.clone());
            counter
        } else {
            Arc::new(DisabledCounter::new(DimensionId::ResponseTime))
        };

        let counters = DashMap::new();
        counters.insert(DimensionId::QueueDepth, queue_depth);
        counters.insert(DimensionId::Sessions, sessions);
        counters.insert(DimensionId::MessageRate, message_rate);
        counters.insert(DimensionId::ResponseTime, response_time);

        tracing::info!(
            target: "load",
            windowed = windowed.len(),
            "load monitor initialized"
        );

        Self { counters, windowed }
    }

    pub fn get(&self, id: DimensionId) -> Option<Arc<dyn Weighable>> {
        self.counters.get(&id).map(|entry| entry.value().clone())
    }

    pub fn queue_depth(&self) -> Arc<dyn Weighable> {
        self.expect(DimensionId::QueueDepth)
    }

    pub fn sessions(&self) -> Arc<dyn Weighable> {
        self.expect(DimensionId::Sessions)
    }

    pub fn message_rate(&self) -> Arc<dyn Weighable> {
        self.expect(DimensionId::MessageRate)
    }

    pub fn response_time(&self) -> Arc<dyn Weighable> {
        self.expect(DimensionId::ResponseTime)
    }

    /// Driven externally once per second by a single scheduler thread;
    /// recomputes every time-windowed counter.
    pub fn tick(&self) {
        for counter in &self.windowed {
            counter.calculate_weight();
        }
    }

    /// Joined diagnostic dump across all dimensions.
    pub fn current_state(&self) -> String {
        let mut lines: Vec<String> = self
            .counters
            .iter()
            .map(|entry| entry.value().current_state())
            .collect();
        lines.sort();
        lines.join("\n")
    }

    fn expect(&self, id: DimensionId) -> Arc<dyn Weighable> {
        // all four dimensions are inserted at construction
        self.counters
            .get(&id)
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| Arc::new(DisabledCounter::new(id)))
    }
}

fn build_level(
    id: DimensionId,
    cfg: &DimensionCfg,
    listener: SharedListener,
    overload: SharedOverload,
) -> LevelCounter {
    LevelCounter::new(
        id,
        cfg.max_allowed,
        cfg.water_mark_percent,
        cfg.initial_weight,
        listener,
        overload,
    )
}

fn build_updown(
    id: DimensionId,
    cfg: &DimensionCfg,
    listener: SharedListener,
    overload: SharedOverload,
) -> UpDownCounter {
    UpDownCounter::new(
        id,
        cfg.max_allowed,
        cfg.water_mark_percent,
        cfg.initial_weight,
        listener,
        overload,
    )
}

fn build_rate(
    id: DimensionId,
    cfg: &DimensionCfg,
    listener: SharedListener,
    overload: SharedOverload,
) -> RateCounter {
    RateCounter::new(
        id,
        cfg.max_allowed,
        cfg.water_mark_percent,
        cfg.initial_weight,
        cfg.average_period_secs(),
        listener,
        overload,
    )
}

fn build_peak(
    id: DimensionId,
    cfg: &DimensionCfg,
    listener: SharedListener,
    overload: SharedOverload,
) -> PeakCounter {
    PeakCounter::new(
        id,
        cfg.max_allowed,
        cfg.water_mark_percent,
        cfg.initial_weight,
        cfg.average_period_secs(),
        listener,
        overload,
    )
}
