//! Benchmarks for the click band-limiting filters.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use kick_dsp::dsp::filter::SVFilter;

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        // Lowpass then highpass, the click path
        let mut lowpass = SVFilter::lowpass(3_000.0);
        let mut highpass = SVFilter::highpass(300.0);
        lowpass.prepare(48_000.0);
        highpass.prepare(48_000.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("click_band", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                lowpass.render(black_box(&mut buffer));
                highpass.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
