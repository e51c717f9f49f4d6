//! kick - play a four-on-the-floor pattern through the default output
//!
//! Run with: cargo run --bin kick -- [bpm] [bars]
//!
//! Set RUST_LOG=debug to see every scheduled and finished voice.

use std::time::Duration;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{error, info};

use kick_dsp::dsp::noise::NoiseKind;
use kick_dsp::processor::ProcessorRegistry;
use kick_dsp::{AudioContext, EngineConfig, KickEngine, ParamsUpdate, MAX_BLOCK_SIZE};

/// How far ahead of the audio clock triggers are scheduled, seconds.
const LOOKAHEAD: f64 = 0.1;
/// How often the control loop wakes up.
const TICK: Duration = Duration::from_millis(20);

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let bpm: f64 = match args.next() {
        Some(arg) => arg.parse().wrap_err_with(|| format!("invalid bpm '{arg}'"))?,
        None => 120.0,
    };
    let bars: u32 = match args.next() {
        Some(arg) => arg.parse().wrap_err_with(|| format!("invalid bar count '{arg}'"))?,
        None => 8,
    };
    if !(bpm.is_finite() && bpm > 0.0) {
        return Err(eyre!("bpm must be positive, got {bpm}"));
    }

    // Set up audio
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    let context = AudioContext::new(sample_rate)?;
    let (mut engine, mut renderer) = KickEngine::new(&context, EngineConfig::default())?;
    engine.initialize(&mut ProcessorRegistry::new())?;

    info!("{bpm} BPM, {bars} bars, {sample_rate} Hz, {channels} channels");

    let mut mono = vec![0.0f32; MAX_BLOCK_SIZE];
    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            let total_frames = data.len() / channels;
            let mut frames_written = 0;

            while frames_written < total_frames {
                let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                let block = &mut mono[..frames_to_render];
                renderer.render(block);

                // Copy to output (mono to all channels)
                let out_off = frames_written * channels;
                for (i, &s) in block.iter().enumerate() {
                    for ch in 0..channels {
                        data[out_off + i * channels + ch] = s;
                    }
                }

                frames_written += frames_to_render;
            }
        },
        |err| error!("audio stream error: {err}"),
        None,
    )?;

    stream.play()?;

    let beat = 60.0 / bpm;
    let total_beats = bars * 4;
    let mut next_beat = context.current_time() + LOOKAHEAD;
    let mut scheduled = 0;

    while scheduled < total_beats {
        let horizon = context.current_time() + LOOKAHEAD;

        while next_beat < horizon && scheduled < total_beats {
            // Every other bar: darker, longer, pink click
            if scheduled % 4 == 0 {
                let odd_bar = (scheduled / 4) % 2 == 1;
                engine.update_params(&ParamsUpdate {
                    tune: Some(if odd_bar { 42.0 } else { 50.0 }),
                    decay: Some(if odd_bar { 0.8 } else { 0.5 }),
                    click_noise_type: Some(if odd_bar { NoiseKind::Pink } else { NoiseKind::White }),
                    ..Default::default()
                });
            }

            engine.trigger(Some(next_beat));
            next_beat += beat;
            scheduled += 1;
        }

        engine.poll();
        std::thread::sleep(TICK);
    }

    // Let the last hit ring out
    while engine.active_voices() > 0 {
        engine.poll();
        std::thread::sleep(TICK);
    }

    let stats = engine.stats();
    info!(
        "done: {} triggered, {} completed, {} forced",
        stats.triggered, stats.completed, stats.forced
    );

    engine.disconnect(None)?;
    Ok(())
}
