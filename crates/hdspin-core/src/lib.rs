//! # hdspin-core
//!
//! Kinetic Monte Carlo on random energy landscapes over the N-dimensional
//! spin hypercube.
//!
//! This crate provides:
//! - EREM and GREM landscapes, stored densely or behind a bounded LRU cache
//! - Exact continuous-time (Gillespie) and discrete-time Metropolis engines
//! - Inherent-structure resolution by memoized steepest descent
//! - Grid-sampled energy, aging and ridge observables written as text files
//!
//! The library never logs; [`run::run_tracer`] returns a summary for the
//! caller to report.

#![deny(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod grids;
pub mod inherent;
pub mod landscape;
pub mod obs;
pub mod output;
pub mod run;
pub mod state;

pub use config::{Dynamics, DynamicsSelector, LandscapeModel, RunParameters, SimulationParameters};
pub use error::{HdspinError, Result};
pub use grids::Grids;
pub use landscape::{EnergyLookup, Landscape, StorageKind};
pub use run::{TracerContext, TracerSummary, run_tracer};
pub use state::{SpinState, StateCodec};
