//! Energy trajectory sampled on the energy grid.

use std::io::Write;

use super::LineSink;
use crate::engine::{Observer, Vals};
use crate::error::Result;

/// Emits `checkpoint state energy [state_IS energy_IS]` once per checkpoint.
///
/// A checkpoint is emitted by the first observation whose time reaches it.
/// When one observation passes several checkpoints they all get the state of
/// that observation: for the continuous engine, the state held until then.
pub struct EnergyGrid<W: Write> {
    grid: Vec<u64>,
    pointer: usize,
    sink: LineSink<W>,
}

impl<W: Write> EnergyGrid<W> {
    #[must_use]
    pub fn new(grid: Vec<u64>, sink: LineSink<W>) -> Self {
        Self {
            grid,
            pointer: 0,
            sink,
        }
    }

    /// Checkpoints already written.
    #[must_use]
    pub const fn emitted(&self) -> usize {
        self.pointer
    }

    #[must_use]
    pub fn sink(&self) -> &LineSink<W> {
        &self.sink
    }
}

impl<W: Write> Observer for EnergyGrid<W> {
    fn observe(&mut self, time: f64, vals: &Vals) -> Result<()> {
        while let Some(&checkpoint) = self.grid.get(self.pointer) {
            if checkpoint as f64 > time {
                break;
            }
            let line = match vals.inherent {
                Some((is_state, is_energy)) => format!(
                    "{checkpoint} {} {:.8} {is_state} {is_energy:.8}",
                    vals.state, vals.energy
                ),
                None => format!("{checkpoint} {} {:.8}", vals.state, vals.energy),
            };
            self.sink.line(line)?;
            self.pointer += 1;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.sink.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SpinState;

    fn vals(state: u128, energy: f64) -> Vals {
        Vals::raw(SpinState::from_index(state), energy)
    }

    #[test]
    fn skipped_checkpoints_use_held_state() {
        let mut rec = EnergyGrid::new(vec![0, 1, 2, 5, 10], LineSink::memory("energy"));
        rec.observe(0.4, &vals(3, -1.0)).unwrap();
        rec.observe(0.9, &vals(4, -2.0)).unwrap();
        rec.observe(6.2, &vals(5, -3.0)).unwrap();
        assert_eq!(rec.emitted(), 4);
        rec.observe(12.0, &vals(6, -4.0)).unwrap();
        rec.observe(30.0, &vals(7, -5.0)).unwrap();
        rec.finish().unwrap();
        assert_eq!(
            rec.sink().text(),
            "0 3 -1.00000000\n1 5 -3.00000000\n2 5 -3.00000000\n5 5 -3.00000000\n10 6 -4.00000000\n"
        );
    }

    #[test]
    fn integer_steps_hit_every_checkpoint_once() {
        let grid = vec![0, 1, 3, 9];
        let mut rec = EnergyGrid::new(grid, LineSink::memory("energy"));
        for t in 0..10 {
            rec.observe(f64::from(t), &vals(t as u128, f64::from(t))).unwrap();
        }
        let text = rec.sink().text();
        let checkpoints: Vec<&str> = text.lines().map(|l| l.split(' ').next().unwrap()).collect();
        assert_eq!(checkpoints, ["0", "1", "3", "9"]);
        let states: Vec<&str> = text.lines().map(|l| l.split(' ').nth(1).unwrap()).collect();
        assert_eq!(states, ["0", "1", "3", "9"]);
    }

    #[test]
    fn inherent_columns_follow_raw_columns() {
        let mut rec = EnergyGrid::new(vec![0], LineSink::memory("energy"));
        let v = Vals {
            state: SpinState::from_index(9),
            energy: -0.5,
            inherent: Some((SpinState::from_index(11), -2.25)),
        };
        rec.observe(0.0, &v).unwrap();
        let line = rec.sink().text();
        let cols: Vec<&str> = line.trim().split(' ').collect();
        assert_eq!(cols, ["0", "9", "-0.50000000", "11", "-2.25000000"]);
    }
}
