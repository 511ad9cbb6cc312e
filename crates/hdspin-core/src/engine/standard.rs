//! Discrete-time single-spin-flip Metropolis dynamics.

use std::time::Instant;

use rand::Rng;

use super::{Observer, Probe, SimulationStatistics, TransitionRule};
use crate::error::Result;
use crate::landscape::EnergyLookup;
use crate::state::{SpinState, StateCodec};

#[derive(Debug, Clone, Copy)]
pub struct StandardEngine {
    codec: StateCodec,
    beta: f64,
    rule: TransitionRule,
    n_timesteps: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardOutcome {
    pub final_state: SpinState,
    pub final_energy: f64,
    pub statistics: SimulationStatistics,
}

impl StandardEngine {
    #[must_use]
    pub fn new(codec: StateCodec, beta: f64, rule: TransitionRule, n_timesteps: u64) -> Self {
        Self {
            codec,
            beta,
            rule,
            n_timesteps,
        }
    }

    /// Exactly `n_timesteps` iterations. Iteration `t` observes the state left
    /// after its accept/reject decision, at time `t`.
    pub fn run<L, O, R>(
        &self,
        probe: &mut Probe<'_, L>,
        start: SpinState,
        rng: &mut R,
        observer: &mut O,
    ) -> Result<StandardOutcome>
    where
        L: EnergyLookup + ?Sized,
        O: Observer + ?Sized,
        R: Rng + ?Sized,
    {
        let started = Instant::now();
        let mut stats = SimulationStatistics::default();
        let n = self.codec.n_spins();

        let mut state = start;
        let mut energy = probe.energy(state);
        for step in 0..self.n_timesteps {
            let spin = rng.gen_range(0..n);
            let proposed = self.codec.flip(state, spin);
            let proposed_energy = probe.energy(proposed);
            let p = self.rule.weight(self.beta, proposed_energy - energy);
            if rng.r#gen::<f64>() <= p {
                state = proposed;
                energy = proposed_energy;
                stats.acceptances += 1;
            } else {
                stats.rejections += 1;
            }
            stats.total_steps += 1;

            let vals = probe.vals(state, energy);
            observer.observe(step as f64, &vals)?;
        }

        observer.finish()?;
        stats.total_waiting_time = self.n_timesteps as f64;
        stats.set_wall_time(started.elapsed());
        Ok(StandardOutcome {
            final_state: state,
            final_energy: energy,
            statistics: stats,
        })
    }
}
