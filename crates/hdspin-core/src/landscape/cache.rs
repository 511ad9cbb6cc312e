//! Bounded least-recently-used energy cache.
//!
//! An evicted energy is recomputed from the oracle on its next lookup, so
//! eviction never changes the landscape.

use std::num::NonZeroUsize;

use lru::LruCache;
use serde::Serialize;

use super::oracle::EnergyOracle;
use crate::state::SpinState;

/// Approximate bytes per cached energy: key, value, recency links, map entry.
pub const ENTRY_COST_BYTES: u64 = 64;

/// Lookup counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

#[derive(Debug)]
pub struct CachedEnergies {
    oracle: EnergyOracle,
    entries: LruCache<SpinState, f64>,
    stats: CacheStats,
}

impl CachedEnergies {
    #[must_use]
    pub fn with_capacity(oracle: EnergyOracle, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            oracle,
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Capacity for a memory budget in bytes.
    #[must_use]
    pub fn capacity_for_budget(memory: u64) -> usize {
        usize::try_from(memory / ENTRY_COST_BYTES)
            .unwrap_or(usize::MAX)
            .max(1)
    }

    pub fn energy(&mut self, state: SpinState) -> f64 {
        if let Some(&energy) = self.entries.get(&state) {
            self.stats.hits += 1;
            return energy;
        }
        self.stats.misses += 1;
        let energy = self.oracle.draw(state);
        // Only reached on a miss, so a returned pair is always an eviction.
        if self.entries.push(state, energy).is_some() {
            self.stats.evictions += 1;
        }
        energy
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    #[must_use]
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Whether `state` is resident, without touching its recency.
    #[must_use]
    pub fn contains(&self, state: SpinState) -> bool {
        self.entries.contains(&state)
    }
}
