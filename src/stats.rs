//! Running counters derived from traces.
//!
//! Counting is done from the events themselves, so the numbers always agree
//! with what a renderer showed.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::event::{Event, Trace};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceStats {
    pub calls: u64,
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub updates: u64,
    pub promotions: u64,
    pub evictions: u64,
}

impl TraceStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one call's trace into the counters.
    pub fn record<K, V>(&mut self, trace: &Trace<K, V>) {
        self.calls += 1;
        for event in trace {
            match event {
                Event::Miss { .. } => self.misses += 1,
                Event::Hit { .. } => self.hits += 1,
                Event::Insert { .. } => self.inserts += 1,
                Event::Update { .. } => self.updates += 1,
                Event::Promote { .. } => self.promotions += 1,
                Event::Evict { .. } => self.evictions += 1,
            }
        }
    }

    /// Hits over `get` calls; 0.0 before the first `get`.
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
