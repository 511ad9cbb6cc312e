//! Two-time aging correlators on the `pi1`/`pi2` grids.
//!
//! Point `i` of `pi1` is a waiting time t_w and point `i` of `pi2` is
//! t_w·(1 + dw). Whatever is recorded at `pi1[i]` is compared with the
//! trajectory at `pi2[i]`; each grid has its own advancing pointer.

use std::io::Write;

use super::LineSink;
use crate::config::Thresholds;
use crate::engine::{Observer, Vals};
use crate::error::Result;
use crate::state::SpinState;

/// Advance `pointer` over every checkpoint of `grid` reached at `time`.
fn crossed(grid: &[u64], pointer: &mut usize, time: f64) -> Option<u64> {
    let &checkpoint = grid.get(*pointer)?;
    if checkpoint as f64 > time {
        return None;
    }
    *pointer += 1;
    Some(checkpoint)
}

/// Configurational persistence: `pi1` lines are `t state`, `pi2` lines are
/// `t state same` with `same = 1` iff the state equals the one at `pi1[i]`.
pub struct AgingConfig<W: Write> {
    pi1: Vec<u64>,
    pi2: Vec<u64>,
    pointer1: usize,
    pointer2: usize,
    recorded: Vec<SpinState>,
    out_pi1: LineSink<W>,
    out_pi2: LineSink<W>,
}

impl<W: Write> AgingConfig<W> {
    #[must_use]
    pub fn new(pi1: Vec<u64>, pi2: Vec<u64>, out_pi1: LineSink<W>, out_pi2: LineSink<W>) -> Self {
        Self {
            recorded: Vec::with_capacity(pi1.len()),
            pi1,
            pi2,
            pointer1: 0,
            pointer2: 0,
            out_pi1,
            out_pi2,
        }
    }

    #[must_use]
    pub fn sinks(&self) -> (&LineSink<W>, &LineSink<W>) {
        (&self.out_pi1, &self.out_pi2)
    }
}

impl<W: Write> Observer for AgingConfig<W> {
    fn observe(&mut self, time: f64, vals: &Vals) -> Result<()> {
        while let Some(t) = crossed(&self.pi1, &mut self.pointer1, time) {
            self.recorded.push(vals.state);
            self.out_pi1.line(format!("{t} {}", vals.state))?;
        }
        while let Some(t) = crossed(&self.pi2, &mut self.pointer2, time) {
            let i = self.pointer2 - 1;
            let same = self.recorded.get(i) == Some(&vals.state);
            self.out_pi2
                .line(format!("{t} {} {}", vals.state, u8::from(same)))?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out_pi1.flush()?;
        self.out_pi2.flush()
    }
}

/// Basin bookkeeping for one observable against one threshold.
///
/// The index counts basin entries: it is −1 until the trajectory first goes
/// below the threshold and increments on every later re-entry from above.
/// Between entries it keeps naming the last basin visited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasinIndex {
    threshold: Option<f64>,
    index: i64,
    inside: Option<bool>,
}

impl BasinIndex {
    #[must_use]
    pub const fn new(threshold: Option<f64>) -> Self {
        Self {
            threshold,
            index: -1,
            inside: None,
        }
    }

    /// Feed the next value; returns `(basin index, in basin)`. A missing
    /// threshold or value reports `(-1, false)`.
    pub fn update(&mut self, value: Option<f64>) -> (i64, bool) {
        let (Some(threshold), Some(value)) = (self.threshold, value) else {
            return (-1, false);
        };
        let inside = value < threshold;
        if inside && self.inside != Some(true) {
            self.index += 1;
        }
        self.inside = Some(inside);
        (self.index, inside)
    }
}

const VARIANTS: usize = 4;

/// Basin persistence for E, E_IS, S and S_IS (in that column order).
///
/// `pi1` lines: `t` then `index in_basin` per variant. `pi2` lines: `t` then
/// `index in_basin same` per variant, `same = 1` iff the tracer is inside the
/// same basin at both times.
pub struct AgingBasin<W: Write> {
    pi1: Vec<u64>,
    pi2: Vec<u64>,
    pointer1: usize,
    pointer2: usize,
    basins: [BasinIndex; VARIANTS],
    current: [(i64, bool); VARIANTS],
    recorded: Vec<[(i64, bool); VARIANTS]>,
    out_pi1: LineSink<W>,
    out_pi2: LineSink<W>,
}

impl<W: Write> AgingBasin<W> {
    #[must_use]
    pub fn new(
        pi1: Vec<u64>,
        pi2: Vec<u64>,
        thresholds: Thresholds,
        out_pi1: LineSink<W>,
        out_pi2: LineSink<W>,
    ) -> Self {
        let e = Some(thresholds.energetic);
        let s = thresholds.entropic;
        Self {
            recorded: Vec::with_capacity(pi1.len()),
            pi1,
            pi2,
            pointer1: 0,
            pointer2: 0,
            basins: [
                BasinIndex::new(e),
                BasinIndex::new(e),
                BasinIndex::new(s),
                BasinIndex::new(s),
            ],
            current: [(-1, false); VARIANTS],
            out_pi1,
            out_pi2,
        }
    }

    #[must_use]
    pub fn sinks(&self) -> (&LineSink<W>, &LineSink<W>) {
        (&self.out_pi1, &self.out_pi2)
    }
}

impl<W: Write> Observer for AgingBasin<W> {
    fn observe(&mut self, time: f64, vals: &Vals) -> Result<()> {
        let raw = Some(vals.energy);
        let inherent = vals.inherent.map(|(_, e)| e);
        let inputs = [raw, inherent, raw, inherent];
        for (k, input) in inputs.into_iter().enumerate() {
            self.current[k] = self.basins[k].update(input);
        }

        while let Some(t) = crossed(&self.pi1, &mut self.pointer1, time) {
            self.recorded.push(self.current);
            let mut line = t.to_string();
            for (index, inside) in self.current {
                line.push_str(&format!(" {index} {}", u8::from(inside)));
            }
            self.out_pi1.line(line)?;
        }
        while let Some(t) = crossed(&self.pi2, &mut self.pointer2, time) {
            let earlier = self.recorded.get(self.pointer2 - 1).copied();
            let mut line = t.to_string();
            for (k, (index, inside)) in self.current.into_iter().enumerate() {
                let same = earlier.is_some_and(|rec| {
                    let (index1, inside1) = rec[k];
                    inside && inside1 && index == index1
                });
                line.push_str(&format!(" {index} {} {}", u8::from(inside), u8::from(same)));
            }
            self.out_pi2.line(line)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out_pi1.flush()?;
        self.out_pi2.flush()
    }
}
