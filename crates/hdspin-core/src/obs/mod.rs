//! Observable recorders.
//!
//! Every recorder is an [`Observer`] writing whole lines to a [`LineSink`].
//! [`Recorders`] fans one trajectory out to all of them.

pub mod aging;
pub mod energy;
pub mod psi;
pub mod ridge;

use std::io::Write;
use std::path::PathBuf;

use crate::engine::{Observer, Vals};
use crate::error::{HdspinError, Result};

pub use aging::{AgingBasin, AgingConfig, BasinIndex};
pub use energy::EnergyGrid;
pub use psi::PsiConfig;
pub use ridge::{RidgeTracker, RidgeWatch, Rolling};

/// Line-oriented output. Each record is formatted completely before it is
/// handed to the writer, so a buffered writer only ever holds whole lines.
#[derive(Debug)]
pub struct LineSink<W: Write> {
    out: W,
    path: PathBuf,
}

impl<W: Write> LineSink<W> {
    /// `path` names the destination in error messages.
    pub fn new(out: W, path: impl Into<PathBuf>) -> Self {
        Self {
            out,
            path: path.into(),
        }
    }

    pub fn line(&mut self, mut record: String) -> Result<()> {
        record.push('\n');
        self.out
            .write_all(record.as_bytes())
            .map_err(|e| HdspinError::io(&self.path, e))
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush().map_err(|e| HdspinError::io(&self.path, e))
    }
}

impl LineSink<Vec<u8>> {
    /// In-memory sink.
    #[must_use]
    pub fn memory(name: &str) -> Self {
        Self::new(Vec::new(), name)
    }

    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.out).into_owned()
    }
}

/// All recorders of one tracer.
pub struct Recorders<W: Write> {
    pub energy: EnergyGrid<W>,
    pub aging_config: AgingConfig<W>,
    pub aging_basin: AgingBasin<W>,
    pub rolling: Rolling<W>,
    pub psi_config: PsiConfig<W>,
}

impl<W: Write> Observer for Recorders<W> {
    fn observe(&mut self, time: f64, vals: &Vals) -> Result<()> {
        self.energy.observe(time, vals)?;
        self.aging_config.observe(time, vals)?;
        self.aging_basin.observe(time, vals)?;
        self.rolling.observe(time, vals)?;
        self.psi_config.observe(time, vals)
    }

    fn finish(&mut self) -> Result<()> {
        self.energy.finish()?;
        self.aging_config.finish()?;
        self.aging_basin.finish()?;
        self.rolling.finish()?;
        self.psi_config.finish()
    }
}
