//! Energy landscapes.
//!
//! Engines and the inherent-structure resolver depend on [`EnergyLookup`]
//! only. [`Landscape`] picks its storage once, at construction: a dense array
//! when `2^N · 8` bytes fit the memory budget, an LRU cache over the
//! deterministic oracle otherwise.

pub mod cache;
pub mod dense;
pub mod oracle;

use serde::Serialize;

use crate::config::LandscapeModel;
use crate::error::Result;
use crate::state::SpinState;

pub use cache::{CacheStats, CachedEnergies, ENTRY_COST_BYTES};
pub use dense::{DenseEnergies, MAX_DENSE_SPINS};
pub use oracle::EnergyOracle;

/// Energy of a configuration. Total and deterministic for a fixed seed.
pub trait EnergyLookup {
    fn energy(&mut self, state: SpinState) -> f64;

    /// Entries currently held by a bounded cache; 0 for dense storage.
    fn cache_size(&self) -> usize {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Dense,
    Cache,
}

impl StorageKind {
    /// Dense when the whole array fits in `memory` bytes.
    #[must_use]
    pub fn for_budget(n_spins: u32, memory: u64) -> Self {
        match DenseEnergies::required_bytes(n_spins) {
            Some(bytes) if bytes <= u128::from(memory) => Self::Dense,
            _ => Self::Cache,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dense => "dense",
            Self::Cache => "cache",
        }
    }
}

#[derive(Debug)]
pub enum EnergyStore {
    Dense(DenseEnergies),
    Cached(CachedEnergies),
}

#[derive(Debug)]
pub struct Landscape {
    model: Option<LandscapeModel>,
    store: EnergyStore,
}

impl Landscape {
    /// Build the landscape for one tracer.
    pub fn build(model: LandscapeModel, n_spins: u32, seed: u64, memory: u64) -> Result<Self> {
        let oracle = EnergyOracle::new(model, n_spins, seed)?;
        let store = match StorageKind::for_budget(n_spins, memory) {
            StorageKind::Dense => EnergyStore::Dense(DenseEnergies::materialize(&oracle, n_spins)?),
            StorageKind::Cache => EnergyStore::Cached(CachedEnergies::with_capacity(
                oracle,
                CachedEnergies::capacity_for_budget(memory),
            )),
        };
        Ok(Self {
            model: Some(model),
            store,
        })
    }

    /// Dense landscape over explicit energies, indexed by configuration.
    pub fn from_energies(energies: Vec<f64>) -> Result<Self> {
        Ok(Self {
            model: None,
            store: EnergyStore::Dense(DenseEnergies::from_energies(energies)?),
        })
    }

    /// `None` for landscapes built from explicit energies.
    #[must_use]
    pub const fn model(&self) -> Option<LandscapeModel> {
        self.model
    }

    #[must_use]
    pub const fn storage(&self) -> StorageKind {
        match self.store {
            EnergyStore::Dense(_) => StorageKind::Dense,
            EnergyStore::Cached(_) => StorageKind::Cache,
        }
    }

    #[must_use]
    pub fn cache_stats(&self) -> Option<CacheStats> {
        match &self.store {
            EnergyStore::Cached(c) => Some(c.stats()),
            EnergyStore::Dense(_) => None,
        }
    }
}

impl EnergyLookup for Landscape {
    fn energy(&mut self, state: SpinState) -> f64 {
        match &mut self.store {
            EnergyStore::Dense(d) => d.energy(state),
            EnergyStore::Cached(c) => c.energy(state),
        }
    }

    fn cache_size(&self) -> usize {
        match &self.store {
            EnergyStore::Dense(_) => 0,
            EnergyStore::Cached(c) => c.len(),
        }
    }
}
