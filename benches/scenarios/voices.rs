//! Benchmarks for overlapping kick voices.
//!
//! Each iteration renders one block with N voices sounding, the renderer's
//! real per-block cost: smoothing, body, click, shaping and master gain.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use kick_dsp::dsp::distortion::ShaperKind;
use kick_dsp::processor::ProcessorRegistry;
use kick_dsp::{AudioContext, EngineConfig, KickEngine, KickRenderer, ParamsUpdate};

use crate::BLOCK_SIZES;

const VOICE_COUNTS: &[usize] = &[1, 4, 16];

fn engine_with_voices(voices: usize, shaper: ShaperKind) -> (KickEngine, KickRenderer) {
    let context = AudioContext::new(48_000.0).expect("valid sample rate");
    let config = EngineConfig::default().with_seed(1).with_max_voices(voices);
    let (mut engine, renderer) = KickEngine::new(&context, config).expect("open context");
    engine
        .initialize(&mut ProcessorRegistry::new())
        .expect("register processors");

    // Long decay so voices stay alive for the whole measurement
    engine.update_params(&ParamsUpdate {
        decay: Some(5.0),
        click_decay: Some(0.5),
        shaper: Some(shaper),
        ..Default::default()
    });
    for _ in 0..voices {
        engine.trigger(None);
    }
    (engine, renderer)
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for &voices in VOICE_COUNTS {
            for (name, shaper) in [("curve", ShaperKind::Curve), ("algorithmic", ShaperKind::Algorithmic)] {
                let (mut engine, mut renderer) = engine_with_voices(voices, shaper);
                let id = format!("{name}_x{voices}");

                group.bench_with_input(BenchmarkId::new(id, size), &size, |b, _| {
                    b.iter(|| {
                        renderer.render(black_box(&mut buffer));

                        // Keep the voice count up once the long tails run out
                        if renderer.voice_count() < voices {
                            engine.poll();
                            engine.trigger(None);
                        }
                    })
                });
            }
        }
    }

    group.finish();
}
