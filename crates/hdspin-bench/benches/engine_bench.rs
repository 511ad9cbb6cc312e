//! Engine throughput and inherent-structure resolution.

use criterion::{Criterion, criterion_group, criterion_main};
use hdspin_core::engine::{
    GillespieEngine, Observer, Probe, StandardEngine, TransitionRule, Vals,
};
use hdspin_core::inherent::InherentStructureResolver;
use hdspin_core::{Landscape, LandscapeModel, Result, StateCodec};
use rand::SeedableRng;
use rand::rngs::StdRng;

struct Discard;

impl Observer for Discard {
    fn observe(&mut self, _time: f64, vals: &Vals) -> Result<()> {
        criterion::black_box(vals);
        Ok(())
    }
}

fn bench_standard(c: &mut Criterion) {
    let codec = StateCodec::new(20).expect("codec");
    let mut landscape = Landscape::build(LandscapeModel::Erem, 20, 1, 1 << 24).expect("landscape");
    let engine = StandardEngine::new(codec, 1.5, TransitionRule::Metropolis, 10_000);
    let mut rng = StdRng::seed_from_u64(1);
    c.bench_function("standard_10k_steps_n20", |b| {
        b.iter(|| {
            let mut probe = Probe::new(&mut landscape, None);
            let start = codec.random(&mut rng);
            criterion::black_box(engine.run(&mut probe, start, &mut rng, &mut Discard).expect("run"))
        });
    });
}

fn bench_gillespie(c: &mut Criterion) {
    let codec = StateCodec::new(16).expect("codec");
    let mut landscape = Landscape::build(LandscapeModel::Erem, 16, 2, 1 << 24).expect("landscape");
    let engine = GillespieEngine::new(codec, 1.5, TransitionRule::Metropolis, 1_000);
    let mut rng = StdRng::seed_from_u64(2);
    c.bench_function("gillespie_horizon_1e3_n16", |b| {
        b.iter(|| {
            let mut probe = Probe::new(&mut landscape, None);
            let start = codec.random(&mut rng);
            criterion::black_box(engine.run(&mut probe, start, &mut rng, &mut Discard).expect("run"))
        });
    });
}

fn bench_inherent(c: &mut Criterion) {
    let codec = StateCodec::new(20).expect("codec");
    let mut landscape = Landscape::build(LandscapeModel::Grem, 20, 3, 1 << 24).expect("landscape");
    let mut rng = StdRng::seed_from_u64(3);
    c.bench_function("inherent_cold_descent_n20", |b| {
        b.iter(|| {
            let mut resolver = InherentStructureResolver::new(codec);
            let start = codec.random(&mut rng);
            criterion::black_box(resolver.resolve(start, &mut landscape))
        });
    });
}

criterion_group!(benches, bench_standard, bench_gillespie, bench_inherent);
criterion_main!(benches);
