//! Bit-vector configurations and their integer indices.
//!
//! A configuration of N spins is stored as a fixed-width `u128` index. Spin
//! `k` (0-based, MSB first) lives at bit `N - 1 - k`, so the spin sequence read
//! left to right is the binary representation of the index. Engines and
//! recorders only go through [`StateCodec`]; none of them look at bits.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{HdspinError, MAX_SPINS, Result};

/// Index of a configuration in `[0, 2^N)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SpinState(u128);

impl SpinState {
    #[must_use]
    pub const fn from_index(index: u128) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> u128 {
        self.0
    }
}

impl fmt::Display for SpinState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decimal string: JSON numbers cannot carry 128-bit indices.
impl Serialize for SpinState {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Encoding, decoding and one-flip neighborhoods for N spins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateCodec {
    n_spins: u32,
    mask: u128,
}

impl StateCodec {
    pub fn new(n_spins: u32) -> Result<Self> {
        if n_spins == 0 {
            return Err(HdspinError::invalid("N_spins", "must be at least 1"));
        }
        if n_spins > MAX_SPINS {
            return Err(HdspinError::TooManySpins {
                n_spins,
                max: MAX_SPINS,
            });
        }
        let mask = if n_spins == MAX_SPINS {
            u128::MAX
        } else {
            (1u128 << n_spins) - 1
        };
        Ok(Self { n_spins, mask })
    }

    #[must_use]
    pub const fn n_spins(&self) -> u32 {
        self.n_spins
    }

    /// Number of configurations, `None` when it overflows `u128` (N = 128).
    #[must_use]
    pub fn n_configs(&self) -> Option<u128> {
        1u128.checked_shl(self.n_spins)
    }

    /// Place-value sum of the spins, most significant first.
    pub fn encode(&self, spins: &[u8]) -> Result<SpinState> {
        if spins.len() != self.n_spins as usize {
            return Err(HdspinError::invalid(
                "configuration",
                format!("expected {} spins, got {}", self.n_spins, spins.len()),
            ));
        }
        let mut index = 0u128;
        for (k, &s) in spins.iter().enumerate() {
            match s {
                0 => {}
                1 => index |= 1u128 << (self.n_spins as usize - 1 - k),
                other => {
                    return Err(HdspinError::invalid(
                        "configuration",
                        format!("spin {k} has non-binary value {other}"),
                    ));
                }
            }
        }
        Ok(SpinState(index))
    }

    #[must_use]
    pub fn decode(&self, state: SpinState) -> Vec<u8> {
        (0..self.n_spins)
            .map(|k| ((state.0 >> (self.n_spins - 1 - k)) & 1) as u8)
            .collect()
    }

    /// Flip spin `k` (MSB-first position).
    #[must_use]
    pub fn flip(&self, state: SpinState, k: u32) -> SpinState {
        debug_assert!(k < self.n_spins);
        SpinState(state.0 ^ (1u128 << (self.n_spins - 1 - k)))
    }

    /// Fill `out` with the N one-flip neighbors; `out[k]` flips spin `k`, so
    /// the underlying bit position descends with `k`.
    pub fn neighbors_into(&self, state: SpinState, out: &mut Vec<SpinState>) {
        out.clear();
        out.extend((0..self.n_spins).map(|k| self.flip(state, k)));
    }

    #[must_use]
    pub fn neighbors(&self, state: SpinState) -> Vec<SpinState> {
        let mut out = Vec::with_capacity(self.n_spins as usize);
        self.neighbors_into(state, &mut out);
        out
    }

    /// Uniformly random configuration.
    pub fn random<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> SpinState {
        SpinState(rng.r#gen::<u128>() & self.mask)
    }

    /// The spins as a `0`/`1` string, MSB first.
    #[must_use]
    pub fn to_bit_string(&self, state: SpinState) -> String {
        self.decode(state)
            .into_iter()
            .map(|b| if b == 1 { '1' } else { '0' })
            .collect()
    }
}
