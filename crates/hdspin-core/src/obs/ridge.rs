//! Ridge statistics.
//!
//! A ridge is an excursion out of a basin: it opens when the observed value
//! climbs to or above the threshold and closes on the next return below it.
//! The ridge height is the largest value seen during the excursion. Heights of
//! excursions that come back to the configuration they left are kept apart
//! from those that land somewhere else.

use std::io::Write;

use super::LineSink;
use crate::config::Thresholds;
use crate::engine::{Observer, Vals};
use crate::error::Result;
use crate::state::SpinState;

/// Running moments over a stream of ridge heights (Welford).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RidgeTracker {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Default for RidgeTracker {
    fn default() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl RidgeTracker {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// NaN when empty.
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.count == 0 { f64::NAN } else { self.mean }
    }

    /// Population variance; NaN when empty.
    #[must_use]
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.m2 / self.count as f64
        }
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        if self.count == 0 { f64::NAN } else { self.min }
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        if self.count == 0 { f64::NAN } else { self.max }
    }

    /// `mean variance count min max`
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "{:.8} {:.8} {} {:.8} {:.8}",
            self.mean(),
            self.variance(),
            self.count,
            self.min(),
            self.max()
        )
    }
}

/// Ridge detector for one (state, value) stream against one threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct RidgeWatch {
    threshold: Option<f64>,
    pub same: RidgeTracker,
    pub diff: RidgeTracker,
    last_inside: Option<SpinState>,
    ridge: Option<f64>,
    prev_inside: Option<bool>,
}

impl RidgeWatch {
    #[must_use]
    pub fn new(threshold: Option<f64>) -> Self {
        Self {
            threshold,
            same: RidgeTracker::default(),
            diff: RidgeTracker::default(),
            last_inside: None,
            ridge: None,
            prev_inside: None,
        }
    }

    /// Feed one observation. Ignored when either the threshold or the value
    /// is missing.
    pub fn update(&mut self, state: SpinState, value: Option<f64>) {
        let (Some(threshold), Some(value)) = (self.threshold, value) else {
            return;
        };
        let inside = value < threshold;
        if inside {
            if let Some(height) = self.ridge.take() {
                if self.last_inside == Some(state) {
                    self.same.push(height);
                } else {
                    self.diff.push(height);
                }
            }
            self.last_inside = Some(state);
        } else if self.prev_inside == Some(true) {
            self.ridge = Some(value);
        } else if let Some(height) = self.ridge.as_mut() {
            *height = height.max(value);
        }
        self.prev_inside = Some(inside);
    }
}

/// Ridge recorder for the energetic (`ridge_E`) and entropic (`ridge_S`)
/// thresholds. Each file gets four summary lines at the end of the run:
/// same, diff, IS same, IS diff.
pub struct Rolling<W: Write> {
    energetic: [RidgeWatch; 2],
    entropic: [RidgeWatch; 2],
    out_e: LineSink<W>,
    out_s: LineSink<W>,
}

impl<W: Write> Rolling<W> {
    #[must_use]
    pub fn new(thresholds: Thresholds, out_e: LineSink<W>, out_s: LineSink<W>) -> Self {
        let e = Some(thresholds.energetic);
        let s = thresholds.entropic;
        Self {
            energetic: [RidgeWatch::new(e), RidgeWatch::new(e)],
            entropic: [RidgeWatch::new(s), RidgeWatch::new(s)],
            out_e,
            out_s,
        }
    }

    #[must_use]
    pub fn sinks(&self) -> (&LineSink<W>, &LineSink<W>) {
        (&self.out_e, &self.out_s)
    }
}

fn write_watches<W: Write>(sink: &mut LineSink<W>, watches: &[RidgeWatch; 2]) -> Result<()> {
    for w in watches {
        sink.line(w.same.summary_line())?;
        sink.line(w.diff.summary_line())?;
    }
    sink.flush()
}

impl<W: Write> Observer for Rolling<W> {
    fn observe(&mut self, _time: f64, vals: &Vals) -> Result<()> {
        let raw = (vals.state, Some(vals.energy));
        let (is_state, is_energy) = match vals.inherent {
            Some((s, e)) => (s, Some(e)),
            None => (vals.state, None),
        };
        for watches in [&mut self.energetic, &mut self.entropic] {
            watches[0].update(raw.0, raw.1);
            watches[1].update(is_state, is_energy);
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        write_watches(&mut self.out_e, &self.energetic)?;
        write_watches(&mut self.out_s, &self.entropic)
    }
}
