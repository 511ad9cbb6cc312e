//! Stochastic dynamics.
//!
//! [`GillespieEngine`] advances a continuous clock by exponential waiting
//! times; [`StandardEngine`] runs a fixed number of single-spin-flip
//! Metropolis iterations. Both report to an [`Observer`] and share a
//! [`TransitionRule`], so at equilibrium they sample the same Boltzmann
//! distribution.

mod gillespie;
mod standard;

pub use gillespie::GillespieEngine;
pub use standard::StandardEngine;

use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::error::{HdspinError, Result};
use crate::inherent::InherentStructureResolver;
use crate::landscape::EnergyLookup;
use crate::state::SpinState;

/// One observation handed to the recorders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vals {
    pub state: SpinState,
    pub energy: f64,
    /// Inherent structure and its energy, when those observables are enabled.
    pub inherent: Option<(SpinState, f64)>,
}

impl Vals {
    #[must_use]
    pub const fn raw(state: SpinState, energy: f64) -> Self {
        Self {
            state,
            energy,
            inherent: None,
        }
    }
}

/// Receives the trajectory. `time` is the continuous clock for the Gillespie
/// engine and the iteration index for the standard engine.
pub trait Observer {
    fn observe(&mut self, time: f64, vals: &Vals) -> Result<()>;

    /// Called once after the last observation.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<O: Observer + ?Sized> Observer for &mut O {
    fn observe(&mut self, time: f64, vals: &Vals) -> Result<()> {
        (**self).observe(time, vals)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

/// Transition probability (standard) or rate (Gillespie) for an energy change.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionRule {
    /// min(1, exp(−β·ΔE))
    #[default]
    Metropolis,
    /// 1 / (1 + exp(β·ΔE))
    Glauber,
}

impl TransitionRule {
    #[must_use]
    pub fn weight(self, beta: f64, delta_e: f64) -> f64 {
        match self {
            Self::Metropolis => (-beta * delta_e).exp().min(1.0),
            Self::Glauber => 1.0 / (1.0 + (beta * delta_e).exp()),
        }
    }
}

impl FromStr for TransitionRule {
    type Err = HdspinError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "metropolis" => Ok(Self::Metropolis),
            "glauber" => Ok(Self::Glauber),
            _ => Err(HdspinError::invalid(
                "rule",
                format!("'{s}' (expected metropolis or glauber)"),
            )),
        }
    }
}

/// Counters accumulated over one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationStatistics {
    pub total_steps: u64,
    pub acceptances: u64,
    pub rejections: u64,
    /// Sum of Gillespie waiting times; equals the final clock.
    pub total_waiting_time: f64,
    pub total_wall_time: f64,
}

impl SimulationStatistics {
    #[must_use]
    pub fn acceptance_rate(&self) -> f64 {
        let proposals = self.acceptances + self.rejections;
        if proposals == 0 {
            return 0.0;
        }
        self.acceptances as f64 / proposals as f64
    }

    /// Wall seconds per unit of simulated time.
    #[must_use]
    pub fn walltime_per_waitingtime(&self) -> f64 {
        if self.total_waiting_time > 0.0 {
            self.total_wall_time / self.total_waiting_time
        } else {
            0.0
        }
    }

    fn set_wall_time(&mut self, elapsed: Duration) {
        self.total_wall_time = elapsed.as_secs_f64();
    }
}

/// Shared per-step plumbing: energy reads and optional inherent structures.
pub struct Probe<'a, L: EnergyLookup + ?Sized> {
    pub landscape: &'a mut L,
    pub inherent: Option<&'a mut InherentStructureResolver>,
}

impl<'a, L: EnergyLookup + ?Sized> Probe<'a, L> {
    pub fn new(landscape: &'a mut L, inherent: Option<&'a mut InherentStructureResolver>) -> Self {
        Self {
            landscape,
            inherent,
        }
    }

    pub fn energy(&mut self, state: SpinState) -> f64 {
        self.landscape.energy(state)
    }

    /// Observation for a state whose energy is already known.
    pub fn vals(&mut self, state: SpinState, energy: f64) -> Vals {
        let inherent = self.inherent.as_deref_mut().map(|r| {
            let min = r.resolve(state, &mut *self.landscape);
            (min, self.landscape.energy(min))
        });
        Vals {
            state,
            energy,
            inherent,
        }
    }
}
