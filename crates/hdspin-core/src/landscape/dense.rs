//! Fully materialized landscape: one `f64` per configuration.

use super::oracle::EnergyOracle;
use crate::error::{HdspinError, Result};
use crate::state::SpinState;

/// Past this many spins a dense array cannot be addressed on any target.
pub const MAX_DENSE_SPINS: u32 = 40;

#[derive(Debug, Clone)]
pub struct DenseEnergies {
    energies: Vec<f64>,
}

impl DenseEnergies {
    /// Bytes a dense array for `n_spins` needs, `None` beyond [`MAX_DENSE_SPINS`].
    #[must_use]
    pub fn required_bytes(n_spins: u32) -> Option<u128> {
        (n_spins <= MAX_DENSE_SPINS).then(|| (1u128 << n_spins) * std::mem::size_of::<f64>() as u128)
    }

    /// Draw every energy eagerly from the oracle.
    pub fn materialize(oracle: &EnergyOracle, n_spins: u32) -> Result<Self> {
        let bytes = Self::required_bytes(n_spins).unwrap_or(u128::MAX);
        let alloc_err = || HdspinError::DenseAllocation { n_spins, bytes };
        if n_spins > MAX_DENSE_SPINS {
            return Err(alloc_err());
        }
        let len = usize::try_from(1u128 << n_spins).map_err(|_| alloc_err())?;
        let mut energies = Vec::new();
        energies.try_reserve_exact(len).map_err(|_| alloc_err())?;
        energies.extend((0..len as u128).map(|i| oracle.draw(SpinState::from_index(i))));
        Ok(Self { energies })
    }

    /// Wrap explicit energies; the length must be a power of two.
    pub fn from_energies(energies: Vec<f64>) -> Result<Self> {
        if energies.len() < 2 || !energies.len().is_power_of_two() {
            return Err(HdspinError::invalid(
                "energies",
                format!("length {} is not 2^N for N >= 1", energies.len()),
            ));
        }
        Ok(Self { energies })
    }

    #[must_use]
    pub fn n_spins(&self) -> u32 {
        self.energies.len().trailing_zeros()
    }

    #[must_use]
    pub fn energy(&self, state: SpinState) -> f64 {
        self.energies[state.index() as usize]
    }
}
