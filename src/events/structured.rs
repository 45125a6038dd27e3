//! Structured load events and the bus they travel on.
//!
//! The aggregator/transport that encodes weights into the load-balancer
//! heartbeat subscribes here. Publishing happens synchronously on the
//! thread that mutated the counter; bus implementations holding shared
//! aggregate state are responsible for their own thread-safety.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::core::load::DimensionId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum LoadEvent {
    /// A dimension's quantized weight changed.
    WeightChanged {
        dimension: DimensionId,
        weight: u8,
        load: u64,
    },
    /// Raw load ran more than 20% past the configured maximum.
    Overloaded { dimension: DimensionId, load: u64 },
}

#[derive(Debug, Error)]
pub enum EventBusError {
    #[error("global event bus already set")]
    AlreadyInitialized,
}

pub trait EventBus: Send + Sync + 'static {
    fn publish(&self, evt: LoadEvent);
}

/// In-memory bus for tests and development.
#[derive(Clone, Default)]
pub struct MemoryEventBus {
    inner: Arc<Mutex<Vec<LoadEvent>>>,
}

impl MemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_all(&self) -> Vec<LoadEvent> {
        if let Ok(mut g) = self.inner.lock() {
            let out = g.clone();
            g.clear();
            out
        } else {
            Vec::new()
        }
    }

    pub fn snapshot(&self) -> Vec<LoadEvent> {
        if let Ok(g) = self.inner.lock() {
            g.clone()
        } else {
            Vec::new()
        }
    }
}

impl EventBus for MemoryEventBus {
    fn publish(&self, evt: LoadEvent) {
        if let Ok(mut g) = self.inner.lock() {
            g.push(evt);
        }
    }
}

static GLOBAL_BUS: OnceCell<Arc<dyn EventBus>> = OnceCell::new();

pub fn set_global_event_bus(bus: Arc<dyn EventBus>) -> Result<(), EventBusError> {
    GLOBAL_BUS
        .set(bus)
        .map_err(|_| EventBusError::AlreadyInitialized)
}

pub fn publish_global(evt: LoadEvent) {
    if let Some(bus) = GLOBAL_BUS.get() {
        bus.publish(evt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_event_bus_basic() {
        let bus = MemoryEventBus::new();
        bus.publish(LoadEvent::WeightChanged {
            dimension: DimensionId::Sessions,
            weight: 8,
            load: 42,
        });
        bus.publish(LoadEvent::Overloaded {
            dimension: DimensionId::MessageRate,
            load: 990,
        });
        let snapshot = bus.snapshot();
        assert_eq!(snapshot.len(), 2);
        let taken = bus.take_all();
        assert_eq!(taken.len(), 2);
        assert!(bus.take_all().is_empty());
    }

    #[test]
    fn load_event_serializes_tagged() {
        let evt = LoadEvent::WeightChanged {
            dimension: DimensionId::QueueDepth,
            weight: 3,
            load: 700,
        };
        let s = serde_json::to_string(&evt).unwrap();
        assert!(s.contains("\"type\":\"WeightChanged\""));
        assert!(s.contains("\"dimension\":\"queueDepth\""));
        let back: LoadEvent = serde_json::from_str(&s).unwrap();
        assert_eq!(back, evt);
    }
}
