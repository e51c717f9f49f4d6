//! Benchmarks for distortion curve construction and lookup.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use kick_dsp::dsp::curve::{LookupTable, DEFAULT_TABLE_SIZE};

use crate::BLOCK_SIZES;

pub fn bench_curve(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/curve");

    // Rebuilt on the control thread whenever the shape changes
    group.bench_function("build", |b| {
        b.iter(|| LookupTable::build(black_box(0.5), black_box(0.5), DEFAULT_TABLE_SIZE))
    });

    let table = LookupTable::build(0.5, 0.5, DEFAULT_TABLE_SIZE);
    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();
        let mut output = vec![0.0f32; size];

        group.bench_with_input(BenchmarkId::new("lookup", size), &size, |b, _| {
            b.iter(|| {
                for (out, &x) in output.iter_mut().zip(input.iter()) {
                    *out = table.lookup(black_box(x));
                }
            })
        });
    }

    group.finish();
}
