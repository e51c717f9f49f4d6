//! Benchmarks for the ADSR and percussive envelopes.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use kick_dsp::dsp::envelope::Envelope;
use kick_dsp::dsp::percussive::{PercussiveEnvelope, PitchSweep};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (ramping up)
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.1, 0.1, 0.7, 0.3);
        env.note_on();
        group.bench_with_input(BenchmarkId::new("adsr_attack", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });

        // Release phase (ramping down)
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.001, 0.001, 0.7, 10.0);
        env.note_on();
        for _ in 0..200 {
            env.next_sample();
        }
        env.note_off();
        group.bench_with_input(BenchmarkId::new("adsr_release", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });

        // Body amplitude and pitch evaluated at absolute time, as a voice does
        let amp = PercussiveEnvelope::body(0.5);
        let sweep = PitchSweep::new(50.0, 150.0, 0.05);
        group.bench_with_input(BenchmarkId::new("percussive", size), &size, |b, _| {
            b.iter(|| {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let t = i as f32 / SAMPLE_RATE;
                    *sample = amp.value_at(black_box(t)) * sweep.frequency_at(black_box(t));
                }
            })
        });
    }

    group.finish();
}
