//! Per-tracer output files.
//!
//! Every file of tracer `i` lives in the data directory and is named
//! `{i:08}_<suffix>.txt`.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::config::RunParameters;
use crate::error::{HdspinError, Result};
use crate::grids::Grids;
use crate::obs::{AgingBasin, AgingConfig, EnergyGrid, LineSink, PsiConfig, Recorders, Rolling};

pub type FileSink = LineSink<BufWriter<File>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub energy: PathBuf,
    pub aging_config_pi1: PathBuf,
    pub aging_config_pi2: PathBuf,
    pub aging_basin_pi1: PathBuf,
    pub aging_basin_pi2: PathBuf,
    pub ridge_e: PathBuf,
    pub ridge_s: PathBuf,
    pub psi_config: PathBuf,
    pub acceptance_rate: PathBuf,
    pub cache_size: PathBuf,
    pub walltime_per_waitingtime: PathBuf,
}

impl OutputPaths {
    #[must_use]
    pub fn for_tracer(data_dir: &Path, index: u32) -> Self {
        let file = |suffix: &str| data_dir.join(format!("{index:08}_{suffix}.txt"));
        Self {
            energy: file("energy"),
            aging_config_pi1: file("aging_config_pi1"),
            aging_config_pi2: file("aging_config_pi2"),
            aging_basin_pi1: file("aging_basin_pi1"),
            aging_basin_pi2: file("aging_basin_pi2"),
            ridge_e: file("ridge_E"),
            ridge_s: file("ridge_S"),
            psi_config: file("psi_config"),
            acceptance_rate: file("acceptance_rate"),
            cache_size: file("cache_size"),
            walltime_per_waitingtime: file("walltime_per_waitingtime"),
        }
    }

    /// Every file with its suffix, in a fixed order.
    #[must_use]
    pub fn all(&self) -> [(&'static str, &Path); 11] {
        [
            ("energy", self.energy.as_path()),
            ("aging_config_pi1", self.aging_config_pi1.as_path()),
            ("aging_config_pi2", self.aging_config_pi2.as_path()),
            ("aging_basin_pi1", self.aging_basin_pi1.as_path()),
            ("aging_basin_pi2", self.aging_basin_pi2.as_path()),
            ("ridge_E", self.ridge_e.as_path()),
            ("ridge_S", self.ridge_s.as_path()),
            ("psi_config", self.psi_config.as_path()),
            ("acceptance_rate", self.acceptance_rate.as_path()),
            ("cache_size", self.cache_size.as_path()),
            ("walltime_per_waitingtime", self.walltime_per_waitingtime.as_path()),
        ]
    }

    /// Create the trajectory files and wire them to a fresh set of recorders.
    pub fn open_recorders(&self, grids: &Grids, params: &RunParameters) -> Result<Recorders<BufWriter<File>>> {
        let thresholds = params.thresholds();
        Ok(Recorders {
            energy: EnergyGrid::new(grids.energy.clone(), create(&self.energy)?),
            aging_config: AgingConfig::new(
                grids.pi1.clone(),
                grids.pi2.clone(),
                create(&self.aging_config_pi1)?,
                create(&self.aging_config_pi2)?,
            ),
            aging_basin: AgingBasin::new(
                grids.pi1.clone(),
                grids.pi2.clone(),
                thresholds,
                create(&self.aging_basin_pi1)?,
                create(&self.aging_basin_pi2)?,
            ),
            rolling: Rolling::new(thresholds, create(&self.ridge_e)?, create(&self.ridge_s)?),
            psi_config: PsiConfig::new(params.log10_n_timesteps, create(&self.psi_config)?),
        })
    }
}

/// Truncating create, buffered.
pub fn create(path: &Path) -> Result<FileSink> {
    let file = File::create(path).map_err(|e| HdspinError::io(path, e))?;
    Ok(LineSink::new(BufWriter::new(file), path))
}

/// Write a file holding a single scalar line.
pub fn write_scalar(path: &Path, value: impl std::fmt::Display) -> Result<()> {
    let mut sink = create(path)?;
    sink.line(value.to_string())?;
    sink.flush()
}
