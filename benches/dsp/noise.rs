//! Benchmarks for noise buffer generation.

use std::hint::black_box;

use criterion::Criterion;
use kick_dsp::dsp::noise::{NoiseGenerator, NoiseKind};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/noise");
    let mut generator = NoiseGenerator::new(StdRng::seed_from_u64(1));

    // Half a second, the size the engine builds
    group.bench_function("white_0.5s", |b| {
        b.iter(|| generator.generate(black_box(NoiseKind::White), 0.5, 48_000.0))
    });
    group.bench_function("pink_0.5s", |b| {
        b.iter(|| generator.generate(black_box(NoiseKind::Pink), 0.5, 48_000.0))
    });

    group.finish();
}
