//! Error taxonomy for simulation runs.
//!
//! Configuration errors are raised by [`crate::config::RunParameters::derive`]
//! before any simulation work starts. Resource and numerical errors abort the
//! tracer that hit them. Nothing here is retried.

use std::path::PathBuf;

use thiserror::Error;

/// Widest configuration the state codec can address.
pub const MAX_SPINS: u32 = 128;

#[derive(Debug, Error)]
pub enum HdspinError {
    #[error("unknown landscape model '{0}' (expected EREM or GREM)")]
    UnknownLandscape(String),
    #[error("unknown dynamics '{0}' (expected gillespie, standard or auto)")]
    UnknownDynamics(String),
    #[error("{n_spins} spins exceeds the {max}-bit state width")]
    TooManySpins { n_spins: u32, max: u32 },
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error(
        "dense landscape for {n_spins} spins needs {bytes} bytes and could not be allocated; \
         lower the memory budget to fall back to cache mode"
    )]
    DenseAllocation { n_spins: u32, bytes: u128 },
    #[error("total exit rate vanished at state {state} (t = {time})")]
    ZeroExitRate { state: u128, time: f64 },
    #[error("io on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("grid file {}: line {line}: {reason}", path.display())]
    GridParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

impl HdspinError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// True for errors detected while validating input, before a run starts.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownLandscape(_)
                | Self::UnknownDynamics(_)
                | Self::TooManySpins { .. }
                | Self::InvalidParameter { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, HdspinError>;
