//! Logarithmic sampling grids.
//!
//! Checkpoints are integers spaced uniformly in log10 over the run. The
//! energy grid drives trajectory sampling; `pi1`/`pi2` pair every waiting time
//! t_w with t_w·(1 + dw) for the two-time aging correlators. Grid files hold
//! one integer per line and are shared read-only by every tracer.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::config::RunParameters;
use crate::error::{HdspinError, Result};

pub const ENERGY_GRID_FILE: &str = "energy.txt";
pub const PI1_GRID_FILE: &str = "pi1.txt";
pub const PI2_GRID_FILE: &str = "pi2.txt";

/// `[0, ⌊10^(i·L/n)⌋ for i in 0..=n]` with consecutive duplicates removed.
#[must_use]
pub fn energy_grid(log10_timesteps: u32, n_gridpoints: u32) -> Vec<u64> {
    let delta = f64::from(log10_timesteps) / f64::from(n_gridpoints);
    let mut grid = vec![0u64];
    grid.extend((0..=n_gridpoints).map(|i| 10f64.powf(f64::from(i) * delta) as u64));
    grid.dedup();
    grid
}

/// Paired waiting times: `pi2[i] = ⌊pi1[i]·(1 + dw)⌋`, with `pi1` spanning
/// `[1, ⌊10^L / (1 + dw)⌋]` so every `pi2` point stays inside the run.
#[must_use]
pub fn pi_grids(log10_timesteps: u32, dw: f64, n_gridpoints: u32) -> (Vec<u64>, Vec<u64>) {
    let n_mc = 10f64.powf(f64::from(log10_timesteps));
    let tw_max = ((n_mc / (dw + 1.0)) as u64).max(1);
    let delta = (tw_max as f64).log10() / f64::from(n_gridpoints);

    let mut pi1: Vec<u64> = (0..=n_gridpoints)
        .map(|i| 10f64.powf(f64::from(i) * delta) as u64)
        .collect();
    pi1.dedup();
    let pi2 = pi1.iter().map(|&t| (t as f64 * (dw + 1.0)) as u64).collect();
    (pi1, pi2)
}

/// The three grids of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grids {
    pub energy: Vec<u64>,
    pub pi1: Vec<u64>,
    pub pi2: Vec<u64>,
}

impl Grids {
    #[must_use]
    pub fn generate(params: &RunParameters) -> Self {
        let (pi1, pi2) = pi_grids(params.log10_n_timesteps, params.dw, params.grid_size);
        Self {
            energy: energy_grid(params.log10_n_timesteps, params.grid_size),
            pi1,
            pi2,
        }
    }

    pub fn write_to(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).map_err(|e| HdspinError::io(dir, e))?;
        write_grid(&dir.join(ENERGY_GRID_FILE), &self.energy)?;
        write_grid(&dir.join(PI1_GRID_FILE), &self.pi1)?;
        write_grid(&dir.join(PI2_GRID_FILE), &self.pi2)
    }

    pub fn load_from(dir: &Path) -> Result<Self> {
        let grids = Self {
            energy: load_grid(&dir.join(ENERGY_GRID_FILE))?,
            pi1: load_grid(&dir.join(PI1_GRID_FILE))?,
            pi2: load_grid(&dir.join(PI2_GRID_FILE))?,
        };
        if grids.pi1.len() != grids.pi2.len() {
            return Err(HdspinError::GridParse {
                path: dir.join(PI2_GRID_FILE),
                line: grids.pi2.len(),
                reason: format!(
                    "pi2 has {} points but pi1 has {}",
                    grids.pi2.len(),
                    grids.pi1.len()
                ),
            });
        }
        Ok(grids)
    }

    /// True when every grid file is present in `dir`.
    #[must_use]
    pub fn exist_in(dir: &Path) -> bool {
        [ENERGY_GRID_FILE, PI1_GRID_FILE, PI2_GRID_FILE]
            .iter()
            .all(|f| dir.join(f).is_file())
    }
}

pub fn write_grid(path: &Path, grid: &[u64]) -> Result<()> {
    let mut out = String::with_capacity(grid.len() * 8);
    for v in grid {
        out.push_str(&v.to_string());
        out.push('\n');
    }
    let mut file = fs::File::create(path).map_err(|e| HdspinError::io(path, e))?;
    file.write_all(out.as_bytes())
        .map_err(|e| HdspinError::io(path, e))
}

/// Read a grid; it must be non-decreasing.
pub fn load_grid(path: &Path) -> Result<Vec<u64>> {
    let content = fs::read_to_string(path).map_err(|e| HdspinError::io(path, e))?;
    let mut grid = Vec::new();
    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: u64 = line.parse().map_err(|e| HdspinError::GridParse {
            path: path.to_path_buf(),
            line: i + 1,
            reason: format!("'{line}': {e}"),
        })?;
        if grid.last().is_some_and(|&prev| value < prev) {
            return Err(HdspinError::GridParse {
                path: path.to_path_buf(),
                line: i + 1,
                reason: format!("{value} is smaller than the previous checkpoint"),
            });
        }
        grid.push(value);
    }
    Ok(grid)
}
