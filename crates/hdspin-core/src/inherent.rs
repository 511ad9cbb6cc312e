//! Inherent structures: the local minimum reached by steepest descent.
//!
//! A resolved entry is never recomputed or overwritten for the lifetime of
//! the resolver. Descent reads every energy through the lookup, so a cache
//! may evict anything between two reads.

use std::collections::HashMap;

use crate::landscape::EnergyLookup;
use crate::state::{SpinState, StateCodec};

#[derive(Debug)]
pub struct InherentStructureResolver {
    codec: StateCodec,
    /// Starting index -> minimum index. A missing key is the unresolved state.
    map: HashMap<SpinState, SpinState>,
    neighbors: Vec<SpinState>,
    descents: u64,
}

impl InherentStructureResolver {
    #[must_use]
    pub fn new(codec: StateCodec) -> Self {
        Self {
            codec,
            map: HashMap::new(),
            neighbors: Vec::with_capacity(codec.n_spins() as usize),
            descents: 0,
        }
    }

    /// Minimum reached from `start`, memoized per starting index.
    pub fn resolve<L: EnergyLookup + ?Sized>(&mut self, start: SpinState, landscape: &mut L) -> SpinState {
        if let Some(&min) = self.map.get(&start) {
            return min;
        }
        self.descents += 1;

        let mut current = start;
        let mut current_energy = landscape.energy(current);
        loop {
            // Descent is deterministic, so an already resolved waypoint ends it.
            if current != start
                && let Some(&min) = self.map.get(&current)
            {
                current = min;
                break;
            }
            self.codec.neighbors_into(current, &mut self.neighbors);
            let mut best = current;
            let mut best_energy = current_energy;
            for &nb in &self.neighbors {
                let e = landscape.energy(nb);
                if e < best_energy {
                    best = nb;
                    best_energy = e;
                }
            }
            if best == current {
                break;
            }
            current = best;
            current_energy = best_energy;
        }

        self.map.insert(start, current);
        current
    }

    /// Resolved minimum for `state`, without computing one.
    #[must_use]
    pub fn lookup(&self, state: SpinState) -> Option<SpinState> {
        self.map.get(&state).copied()
    }

    /// Number of resolved starting indices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Descents actually performed (memo hits excluded).
    #[must_use]
    pub const fn descents(&self) -> u64 {
        self.descents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LandscapeModel;
    use crate::landscape::Landscape;

    fn s(i: u128) -> SpinState {
        SpinState::from_index(i)
    }

    /// Counts lookups so tests can see whether work was repeated.
    struct Counting {
        inner: Landscape,
        reads: usize,
    }

    impl EnergyLookup for Counting {
        fn energy(&mut self, state: SpinState) -> f64 {
            self.reads += 1;
            self.inner.energy(state)
        }
    }

    #[test]
    fn descends_to_single_minimum() {
        // Energy decreases with the number of set bits; 111 is the minimum.
        let energies: Vec<f64> = (0..8u32).map(|i| -f64::from(i.count_ones())).collect();
        let mut l = Landscape::from_energies(energies).unwrap();
        let mut r = InherentStructureResolver::new(StateCodec::new(3).unwrap());
        for i in 0..8 {
            assert_eq!(r.resolve(s(i), &mut l), s(7));
        }
    }

    #[test]
    fn local_minimum_resolves_to_itself() {
        // 00 and 11 are both minima, 01 and 10 are ridges.
        let mut l = Landscape::from_energies(vec![-1.0, 0.0, 0.5, -2.0]).unwrap();
        let mut r = InherentStructureResolver::new(StateCodec::new(2).unwrap());
        assert_eq!(r.resolve(s(0), &mut l), s(0));
        assert_eq!(r.resolve(s(3), &mut l), s(3));
        // From 01 the neighbors are 11 (-2) and 00 (-1): steepest picks 11.
        assert_eq!(r.resolve(s(1), &mut l), s(3));
        assert_eq!(r.resolve(s(2), &mut l), s(3));
    }

    #[test]
    fn resolving_twice_does_no_work() {
        let inner = Landscape::build(LandscapeModel::Grem, 12, 4, 1 << 20).unwrap();
        let mut l = Counting { inner, reads: 0 };
        let mut r = InherentStructureResolver::new(StateCodec::new(12).unwrap());
        let first = r.resolve(s(1234), &mut l);
        let reads = l.reads;
        let descents = r.descents();
        assert_eq!(r.resolve(s(1234), &mut l), first);
        assert_eq!(l.reads, reads);
        assert_eq!(r.descents(), descents);
        assert_eq!(r.lookup(s(1234)), Some(first));
        assert_eq!(r.lookup(s(4321)), None);
    }

    #[test]
    fn minima_are_local_minima() {
        let mut l = Landscape::build(LandscapeModel::Erem, 10, 21, 1 << 20).unwrap();
        let codec = StateCodec::new(10).unwrap();
        let mut r = InherentStructureResolver::new(codec);
        for i in (0..1024).step_by(37) {
            let min = r.resolve(s(i), &mut l);
            assert!(l.energy(min) <= l.energy(s(i)));
            let e = l.energy(min);
            for nb in codec.neighbors(min) {
                assert!(l.energy(nb) >= e);
            }
        }
    }

    #[test]
    fn works_through_a_tiny_cache() {
        let mut dense = Landscape::build(LandscapeModel::Grem, 10, 8, 1 << 20).unwrap();
        let mut cached = Landscape::build(LandscapeModel::Grem, 10, 8, 64).unwrap();
        let codec = StateCodec::new(10).unwrap();
        let mut a = InherentStructureResolver::new(codec);
        let mut b = InherentStructureResolver::new(codec);
        for i in 0..1024 {
            assert_eq!(a.resolve(s(i), &mut dense), b.resolve(s(i), &mut cached));
        }
    }
}
