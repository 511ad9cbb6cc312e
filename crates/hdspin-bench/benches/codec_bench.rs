//! State codec benchmarks: neighborhood generation and bit-vector round trips.

use criterion::{Criterion, criterion_group, criterion_main};
use hdspin_core::{SpinState, StateCodec};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn bench_neighbors(c: &mut Criterion) {
    for n in [20u32, 64, 128] {
        let codec = StateCodec::new(n).expect("codec");
        let state = codec.random(&mut StdRng::seed_from_u64(1));
        let mut out = Vec::with_capacity(n as usize);
        c.bench_function(&format!("neighbors_into_n{n}"), |b| {
            b.iter(|| {
                codec.neighbors_into(criterion::black_box(state), &mut out);
                criterion::black_box(out.len());
            });
        });
    }
}

fn bench_encode_decode(c: &mut Criterion) {
    let codec = StateCodec::new(128).expect("codec");
    let state = SpinState::from_index(0x0123_4567_89ab_cdef_fedc_ba98_7654_3210);
    c.bench_function("decode_encode_n128", |b| {
        b.iter(|| {
            let spins = codec.decode(criterion::black_box(state));
            criterion::black_box(codec.encode(&spins).expect("encode"));
        });
    });
}

criterion_group!(benches, bench_neighbors, bench_encode_decode);
criterion_main!(benches);
