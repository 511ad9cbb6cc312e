//! One tracer, start to finish.

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::config::{Dynamics, LandscapeModel, RunParameters};
use crate::engine::{GillespieEngine, Probe, SimulationStatistics, StandardEngine, TransitionRule};
use crate::error::Result;
use crate::grids::Grids;
use crate::inherent::InherentStructureResolver;
use crate::landscape::{CacheStats, EnergyLookup, Landscape, StorageKind};
use crate::output::{OutputPaths, write_scalar};
use crate::state::{SpinState, StateCodec};

/// Where and as whom a tracer runs.
#[derive(Debug, Clone, Copy)]
pub struct TracerContext<'a> {
    pub index: u32,
    pub data_dir: &'a Path,
    pub grids: &'a Grids,
    pub rule: TransitionRule,
    /// Seed resolved ahead of the run; `None` resolves it in [`run_tracer`].
    pub seed: Option<u64>,
}

impl<'a> TracerContext<'a> {
    #[must_use]
    pub fn new(index: u32, data_dir: &'a Path, grids: &'a Grids) -> Self {
        Self {
            index,
            data_dir,
            grids,
            rule: TransitionRule::default(),
            seed: None,
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule: TransitionRule) -> Self {
        self.rule = rule;
        self
    }
}

/// What a finished tracer reports back.
#[derive(Debug, Clone, Serialize)]
pub struct TracerSummary {
    pub index: u32,
    /// Seed actually used; rerunning with it reproduces the tracer.
    pub seed: u64,
    pub manual_seed: bool,
    pub landscape: LandscapeModel,
    pub dynamics: Dynamics,
    pub storage: StorageKind,
    pub rule: TransitionRule,
    pub statistics: SimulationStatistics,
    pub acceptance_rate: f64,
    pub walltime_per_waitingtime: f64,
    pub cache_size: usize,
    pub cache: Option<CacheStats>,
    pub inherent_structures: Option<usize>,
    pub final_state: SpinState,
    pub final_energy: f64,
}

/// Resolve the seed of tracer `index`: manual seed plus index, or fresh
/// entropy.
#[must_use]
pub fn tracer_seed(params: &RunParameters, index: u32) -> u64 {
    params.manual_tracer_seed(index).unwrap_or_else(rand::random)
}

/// Run one tracer and write all of its files into `ctx.data_dir`, which must
/// exist. Output files are closed on every exit path.
pub fn run_tracer(params: &RunParameters, ctx: &TracerContext<'_>) -> Result<TracerSummary> {
    let seed = ctx.seed.unwrap_or_else(|| tracer_seed(params, ctx.index));
    let codec = StateCodec::new(params.n_spins)?;
    let mut landscape = Landscape::build(params.landscape, params.n_spins, seed, params.memory)?;
    let storage = landscape.storage();
    let dynamics = params.dynamics.resolve(storage == StorageKind::Dense);

    let mut resolver = params
        .calculate_inherent_structure_observables
        .then(|| InherentStructureResolver::new(codec));

    let paths = OutputPaths::for_tracer(ctx.data_dir, ctx.index);
    let mut recorders = paths.open_recorders(ctx.grids, params)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let start = codec.random(&mut rng);

    let mut probe = Probe::new(&mut landscape, resolver.as_mut());
    let (statistics, final_state) = match dynamics {
        Dynamics::Gillespie => {
            let engine = GillespieEngine::new(codec, params.beta, ctx.rule, params.n_timesteps);
            let out = engine.run(&mut probe, start, &mut rng, &mut recorders)?;
            (out.statistics, out.final_state)
        }
        Dynamics::Standard => {
            let engine = StandardEngine::new(codec, params.beta, ctx.rule, params.n_timesteps);
            let out = engine.run(&mut probe, start, &mut rng, &mut recorders)?;
            (out.statistics, out.final_state)
        }
    };
    drop(recorders);

    let final_energy = landscape.energy(final_state);
    let cache_size = landscape.cache_size();
    write_scalar(&paths.acceptance_rate, statistics.acceptance_rate())?;
    write_scalar(&paths.cache_size, cache_size)?;
    write_scalar(&paths.walltime_per_waitingtime, statistics.walltime_per_waitingtime())?;

    Ok(TracerSummary {
        index: ctx.index,
        seed,
        manual_seed: params.use_manual_seed,
        landscape: params.landscape,
        dynamics,
        storage,
        rule: ctx.rule,
        statistics,
        acceptance_rate: statistics.acceptance_rate(),
        walltime_per_waitingtime: statistics.walltime_per_waitingtime(),
        cache_size,
        cache: landscape.cache_stats(),
        inherent_structures: resolver.as_ref().map(InherentStructureResolver::len),
        final_state,
        final_energy,
    })
}
