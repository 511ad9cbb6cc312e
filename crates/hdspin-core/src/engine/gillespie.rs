//! Exact continuous-time kinetic Monte Carlo (direct method).

use std::time::Instant;

use rand::Rng;
use rand_distr::{Distribution, Exp};

use super::{Observer, Probe, SimulationStatistics, TransitionRule};
use crate::error::{HdspinError, Result};
use crate::landscape::EnergyLookup;
use crate::state::{SpinState, StateCodec};

#[derive(Debug, Clone, Copy)]
pub struct GillespieEngine {
    codec: StateCodec,
    beta: f64,
    rule: TransitionRule,
    /// Compared directly against the continuous clock. This is the same
    /// integer used as the iteration count of the standard engine, so both
    /// engines stop at the same numeric horizon.
    horizon: f64,
}

/// Where a run ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GillespieOutcome {
    pub final_state: SpinState,
    pub final_time: f64,
    pub statistics: SimulationStatistics,
}

impl GillespieEngine {
    #[must_use]
    pub fn new(codec: StateCodec, beta: f64, rule: TransitionRule, n_timesteps: u64) -> Self {
        Self {
            codec,
            beta,
            rule,
            horizon: n_timesteps as f64,
        }
    }

    /// Run from `start` until the clock reaches the horizon.
    ///
    /// Every step observes the state held during the waiting time just drawn,
    /// stamped with the clock at the end of that wait, and only then jumps.
    pub fn run<L, O, R>(
        &self,
        probe: &mut Probe<'_, L>,
        start: SpinState,
        rng: &mut R,
        observer: &mut O,
    ) -> Result<GillespieOutcome>
    where
        L: EnergyLookup + ?Sized,
        O: Observer + ?Sized,
        R: Rng + ?Sized,
    {
        let started = Instant::now();
        let mut stats = SimulationStatistics::default();
        let n = self.codec.n_spins() as usize;
        let mut neighbors = Vec::with_capacity(n);
        let mut rates = Vec::with_capacity(n);

        let mut state = start;
        let mut clock = 0.0f64;
        loop {
            let energy = probe.energy(state);
            self.codec.neighbors_into(state, &mut neighbors);
            rates.clear();
            let mut total_rate = 0.0;
            for &nb in &neighbors {
                let w = self.rule.weight(self.beta, probe.energy(nb) - energy);
                rates.push(w);
                total_rate += w;
            }
            if !(total_rate > 0.0 && total_rate.is_finite()) {
                return Err(HdspinError::ZeroExitRate {
                    state: state.index(),
                    time: clock,
                });
            }

            let waiting_time = Exp::new(total_rate)
                .map_err(|_| HdspinError::ZeroExitRate {
                    state: state.index(),
                    time: clock,
                })?
                .sample(rng);
            clock += waiting_time;
            stats.total_waiting_time += waiting_time;

            let vals = probe.vals(state, energy);
            observer.observe(clock, &vals)?;

            state = neighbors[select(&rates, total_rate, rng.r#gen::<f64>())];
            stats.total_steps += 1;
            stats.acceptances += 1;

            if clock >= self.horizon {
                break;
            }
        }

        observer.finish()?;
        stats.set_wall_time(started.elapsed());
        Ok(GillespieOutcome {
            final_state: state,
            final_time: clock,
            statistics: stats,
        })
    }
}

/// Index `j` with probability `rates[j] / total`, given `u` uniform in [0, 1).
fn select(rates: &[f64], total: f64, u: f64) -> usize {
    let target = u * total;
    let mut cumulative = 0.0;
    let mut last_positive = 0;
    for (j, &w) in rates.iter().enumerate() {
        if w > 0.0 {
            last_positive = j;
        }
        cumulative += w;
        if target < cumulative {
            return j;
        }
    }
    // Rounding left the target at the very top of the range.
    last_positive
}
