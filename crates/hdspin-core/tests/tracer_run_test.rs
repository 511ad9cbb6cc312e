use std::fs;
use std::path::{Path, PathBuf};

use hdspin_core::landscape::EnergyLookup;
use hdspin_core::output::OutputPaths;
use hdspin_core::{
    Dynamics, Grids, Landscape, RunParameters, SimulationParameters, SpinState, StorageKind,
    TracerContext, run_tracer,
};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("hdspin-tracer-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn params(dynamics: &str, inherent: bool) -> RunParameters {
    let mut p = SimulationParameters::new(3, 8, "EREM", 1.5);
    p.dynamics = dynamics.to_string();
    p.seed = 11;
    p.grid_size = 10;
    p.calculate_inherent_structure_observables = inherent;
    RunParameters::derive(&p).unwrap()
}

fn rows(path: &Path) -> Vec<Vec<String>> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| l.split(' ').map(str::to_string).collect())
        .collect()
}

fn scalar(path: &Path) -> f64 {
    fs::read_to_string(path).unwrap().trim().parse().unwrap()
}

#[test]
fn gillespie_tracer_writes_every_file() {
    let dir = scratch_dir("gillespie");
    let params = params("auto", true);
    let grids = Grids::generate(&params);
    let summary = run_tracer(&params, &TracerContext::new(3, &dir, &grids)).unwrap();

    assert_eq!(summary.dynamics, Dynamics::Gillespie);
    assert_eq!(summary.storage, StorageKind::Dense);
    assert_eq!(summary.seed, 14);
    assert!(summary.manual_seed);
    assert!(summary.statistics.total_waiting_time >= 1000.0);
    assert_eq!(summary.acceptance_rate, 1.0);

    let paths = OutputPaths::for_tracer(&dir, 3);
    for (_, p) in paths.all() {
        assert!(p.is_file(), "missing {}", p.display());
    }

    // The final observation is stamped past the horizon, so every checkpoint
    // is reached.
    let energy = rows(&paths.energy);
    assert_eq!(energy.len(), grids.energy.len());
    let mut reference = Landscape::build(params.landscape, params.n_spins, summary.seed, params.memory).unwrap();
    for (row, checkpoint) in energy.iter().zip(&grids.energy) {
        assert_eq!(row.len(), 5);
        assert_eq!(row[0], checkpoint.to_string());
        let state = SpinState::from_index(row[1].parse().unwrap());
        assert_eq!(row[2], format!("{:.8}", reference.energy(state)));
        let e: f64 = row[2].parse().unwrap();
        let e_is: f64 = row[4].parse().unwrap();
        assert!(e_is <= e);
    }

    assert_eq!(rows(&paths.aging_config_pi1).len(), grids.pi1.len());
    assert_eq!(rows(&paths.aging_config_pi2).len(), grids.pi2.len());
    let basin1 = rows(&paths.aging_basin_pi1);
    assert!(basin1.iter().all(|r| r.len() == 9));
    let basin2 = rows(&paths.aging_basin_pi2);
    assert!(basin2.iter().all(|r| r.len() == 13));

    assert_eq!(rows(&paths.ridge_e).len(), 4);
    assert_eq!(rows(&paths.ridge_s).len(), 4);

    // Every jump changes the state, so each observation is its own residence;
    // only the first and the still-open last are left out.
    let psi = rows(&paths.psi_config);
    assert_eq!(psi.len(), 5);
    let counted: u64 = psi.iter().map(|r| r[1].parse::<u64>().unwrap()).sum();
    assert_eq!(counted, summary.statistics.total_steps - 2);

    assert_eq!(scalar(&paths.acceptance_rate), 1.0);
    assert_eq!(scalar(&paths.cache_size), 0.0);
    assert!(scalar(&paths.walltime_per_waitingtime) >= 0.0);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn standard_tracer_in_cache_mode() {
    let dir = scratch_dir("standard");
    let mut p = SimulationParameters::new(3, 8, "GREM", 1.0);
    p.seed = 5;
    p.grid_size = 10;
    // 256 dense energies need 2048 bytes; 1024 leaves a 16-entry cache.
    p.memory = 1024;
    let params = RunParameters::derive(&p).unwrap();
    let grids = Grids::generate(&params);
    let summary = run_tracer(&params, &TracerContext::new(0, &dir, &grids)).unwrap();

    assert_eq!(summary.storage, StorageKind::Cache);
    assert_eq!(summary.dynamics, Dynamics::Standard);
    assert_eq!(summary.statistics.total_steps, 1000);
    assert!(summary.cache_size <= 16);
    assert!(summary.inherent_structures.is_none());

    let paths = OutputPaths::for_tracer(&dir, 0);
    let energy = rows(&paths.energy);
    // Iterations are stamped 0..999, so the 1000 checkpoint is not reached.
    let reachable = grids.energy.iter().filter(|&&c| c < 1000).count();
    assert_eq!(energy.len(), reachable);
    assert!(energy.iter().all(|r| r.len() == 3));

    // IS columns are disabled.
    for row in rows(&paths.aging_basin_pi1) {
        assert_eq!(&row[3..5], ["-1", "0"]);
        assert_eq!(&row[7..9], ["-1", "0"]);
    }
    let psi = rows(&paths.psi_config);
    assert_eq!(psi.len(), 5);
    // Whole iterations: nothing lands below one step.
    assert_eq!(psi[0], ["0", "0"]);
    let counted: u64 = psi.iter().map(|r| r[1].parse::<u64>().unwrap()).sum();
    assert!(counted <= summary.statistics.acceptances);

    let rate = scalar(&paths.acceptance_rate);
    assert!((0.0..=1.0).contains(&rate));
    assert_eq!(scalar(&paths.cache_size), summary.cache_size as f64);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn manual_seed_reproduces_trajectories() {
    let params = params("standard", false);
    let grids = Grids::generate(&params);
    let a = scratch_dir("repro-a");
    let b = scratch_dir("repro-b");
    run_tracer(&params, &TracerContext::new(1, &a, &grids)).unwrap();
    run_tracer(&params, &TracerContext::new(1, &b, &grids)).unwrap();

    let pa = OutputPaths::for_tracer(&a, 1);
    let pb = OutputPaths::for_tracer(&b, 1);
    for (x, y) in [
        (&pa.energy, &pb.energy),
        (&pa.aging_config_pi2, &pb.aging_config_pi2),
        (&pa.aging_basin_pi2, &pb.aging_basin_pi2),
        (&pa.ridge_e, &pb.ridge_e),
        (&pa.psi_config, &pb.psi_config),
    ] {
        assert_eq!(fs::read_to_string(x).unwrap(), fs::read_to_string(y).unwrap());
    }

    let _ = fs::remove_dir_all(&a);
    let _ = fs::remove_dir_all(&b);
}

#[test]
fn missing_data_dir_fails_the_tracer() {
    let params = params("standard", false);
    let grids = Grids::generate(&params);
    let dir = std::env::temp_dir().join(format!("hdspin-tracer-absent-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    let err = run_tracer(&params, &TracerContext::new(0, &dir, &grids)).unwrap_err();
    assert!(!err.is_configuration());
}

#[test]
fn resolved_seed_overrides_the_manual_one() {
    let params = params("standard", false);
    let grids = Grids::generate(&params);
    let a = scratch_dir("seeded-a");
    let b = scratch_dir("seeded-b");
    let forced = run_tracer(&params, &TracerContext::new(1, &a, &grids).with_seed(12)).unwrap();
    // Manual seed 11 gives tracer 1 the seed 12.
    let natural = run_tracer(&params, &TracerContext::new(1, &b, &grids)).unwrap();
    assert_eq!(forced.seed, 12);
    assert_eq!(natural.seed, 12);

    let c = scratch_dir("seeded-c");
    let other = run_tracer(&params, &TracerContext::new(1, &c, &grids).with_seed(99)).unwrap();
    assert_eq!(other.seed, 99);
    assert_eq!(
        fs::read_to_string(OutputPaths::for_tracer(&a, 1).energy).unwrap(),
        fs::read_to_string(OutputPaths::for_tracer(&b, 1).energy).unwrap()
    );

    for dir in [a, b, c] {
        let _ = fs::remove_dir_all(&dir);
    }
}
