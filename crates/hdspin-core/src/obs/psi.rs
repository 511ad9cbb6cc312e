//! Residence-time distribution of configurations.

use std::io::Write;

use super::LineSink;
use crate::engine::{Observer, Vals};
use crate::error::Result;
use crate::state::SpinState;

/// Decade of a residence time: 0 below 1, then `k` for `[10^(k-1), 10^k)`.
#[must_use]
pub fn decade_bin(residence: f64) -> usize {
    let mut bin = 0;
    let mut bound = 1.0;
    while residence.is_finite() && residence >= bound {
        bin += 1;
        bound *= 10.0;
    }
    bin
}

/// Histogram of how long the tracer stays in a configuration.
///
/// A run of observations with the same state is one residence. It lasts from
/// the time of the last observation of the previous run to the time of its
/// own last observation, which is the held interval for the continuous engine
/// and the number of iterations for the standard one. The first run (entered
/// before observation began) and the run still open at the end are not
/// counted. `finish` writes one `bin count` line per decade bin.
pub struct PsiConfig<W: Write> {
    counts: Vec<u64>,
    current: Option<SpinState>,
    run_end: f64,
    previous_end: Option<f64>,
    sink: LineSink<W>,
}

impl<W: Write> PsiConfig<W> {
    /// Bins cover residences up to the horizon `10^log10_n_timesteps`.
    #[must_use]
    pub fn new(log10_n_timesteps: u32, sink: LineSink<W>) -> Self {
        Self {
            counts: vec![0; log10_n_timesteps as usize + 2],
            current: None,
            run_end: 0.0,
            previous_end: None,
            sink,
        }
    }

    #[must_use]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    #[must_use]
    pub fn sink(&self) -> &LineSink<W> {
        &self.sink
    }

    fn record(&mut self, residence: f64) {
        let bin = decade_bin(residence);
        if bin >= self.counts.len() {
            self.counts.resize(bin + 1, 0);
        }
        self.counts[bin] += 1;
    }
}

impl<W: Write> Observer for PsiConfig<W> {
    fn observe(&mut self, time: f64, vals: &Vals) -> Result<()> {
        match self.current {
            Some(state) if state == vals.state => {}
            Some(_) => {
                if let Some(previous_end) = self.previous_end {
                    self.record(self.run_end - previous_end);
                }
                self.previous_end = Some(self.run_end);
            }
            None => {}
        }
        self.current = Some(vals.state);
        self.run_end = time;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        for (bin, count) in self.counts.iter().enumerate() {
            self.sink.line(format!("{bin} {count}"))?;
        }
        self.sink.flush()
    }
}
