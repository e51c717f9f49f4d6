//! Benchmarks for waveshaping distortion.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use kick_dsp::dsp::curve::LookupTable;
use kick_dsp::dsp::distortion::{
    AlgorithmicShaper, CurveShaper, DistortionAlgorithm, ShapeParams, Waveshaper,
};

use crate::BLOCK_SIZES;

pub fn bench_distortion(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/distortion");
    let params = ShapeParams {
        gain: 2.0,
        mix: 0.8,
        character: 0.7,
    };
    let table = Arc::new(LookupTable::build(0.5, 0.5, 44_100));

    for &size in BLOCK_SIZES {
        // Generate a test signal (sine-like values)
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        // Curve lookup with 4x sub-sampling
        let mut shaper = CurveShaper::new(Arc::clone(&table));
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("curve", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                shaper.shape_buffer(black_box(&mut buffer), black_box(&params));
            })
        });

        for (name, algorithm) in [
            ("soft_clip", DistortionAlgorithm::SoftClip),
            ("hard_clip", DistortionAlgorithm::HardClip),
            ("foldback", DistortionAlgorithm::Foldback),
        ] {
            let mut shaper = AlgorithmicShaper::new(algorithm);
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    shaper.shape_buffer(black_box(&mut buffer), black_box(&params));
                })
            });
        }
    }

    group.finish();
}
