use std::fmt;
use std::sync::Arc;

use crate::dsp::curve::LookupTable;
use crate::dsp::distortion::{DistortionAlgorithm, Shaper, ShaperKind};
use crate::dsp::filter::SVFilter;
use crate::dsp::mix::sum_in_place;
use crate::dsp::noise::NoiseBuffer;
use crate::dsp::oscillator::{Oscillator, OscillatorWaveform};
use crate::dsp::percussive::{PercussiveEnvelope, PitchSweep};
use crate::graph::body::BodyNode;
use crate::graph::click::ClickNode;
use crate::graph::node::{GraphNode, RenderCtx};
use crate::graph::schedule::SourceSchedule;
use crate::MAX_BLOCK_SIZE;

/// Extra run time after the body envelope reaches its floor.
pub const BODY_STOP_MARGIN: f64 = 0.1;
/// Extra run time after the click envelope reaches its floor.
pub const CLICK_STOP_MARGIN: f64 = 0.05;

/*
Voice
=====

One drum hit. Built on the control thread when `trigger` is called, moved to
the render thread, and handed back once it has finished so it is dropped off
the render thread.

   body:   osc ─► env ─► shaper ─┐
                                 ├─► mix ─► master
   click:  noise ─► LP ─► HP ─► env ─┘

Lifecycle:

   Scheduled ──(first block reaching start)──► Playing
   Playing   ──(both sources past their stop)──► Completed
   any       ──(release)──► Completed

Completion and release both funnel through `release()`, which disconnects
each node exactly once; a second release finds nothing left to do.

Everything that shapes the sound except the live drive/mix/character/gain is
latched here at creation. Later parameter changes only affect new voices.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(pub u64);

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "voice#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Scheduled,
    Playing,
    Completed,
}

/// Parameters latched into a voice when it is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceSettings {
    pub tune: f32,
    pub punch: f32,
    pub pitch_decay: f32,
    pub decay: f32,
    pub waveform: OscillatorWaveform,
    pub shaper: ShaperKind,
    pub algorithm: DistortionAlgorithm,
    pub click_level: f32,
    pub click_decay: f32,
    pub click_lowpass: f32,
    pub click_highpass: f32,
}

impl VoiceSettings {
    /// Seconds from start until the longest source has stopped.
    pub fn lifetime(&self) -> f64 {
        (self.decay as f64 + BODY_STOP_MARGIN).max(self.click_decay as f64 + CLICK_STOP_MARGIN)
    }
}

/// Shared read-only data a voice reads from.
#[derive(Clone)]
pub struct VoiceResources {
    pub curve: Arc<LookupTable>,
    pub noise: Arc<NoiseBuffer>,
}

pub struct Voice {
    id: VoiceId,
    state: VoiceState,
    start_frame: u64,
    end_frame: u64,
    body: BodyNode,
    click: ClickNode,
    scratch: Vec<f32>,
}

impl Voice {
    /// Build a voice that starts at `start_time` seconds on the audio clock.
    ///
    /// Allocates; call from the control thread.
    pub fn new(
        id: VoiceId,
        settings: &VoiceSettings,
        resources: VoiceResources,
        start_time: f64,
        sample_rate: f32,
    ) -> Self {
        let body_schedule = SourceSchedule::from_seconds(
            start_time,
            settings.decay as f64,
            BODY_STOP_MARGIN,
            sample_rate,
        );
        let click_schedule = SourceSchedule::from_seconds(
            start_time,
            settings.click_decay as f64,
            CLICK_STOP_MARGIN,
            sample_rate,
        );

        let body = BodyNode::new(
            Oscillator::new(settings.waveform),
            PitchSweep::new(settings.tune, settings.punch, settings.pitch_decay),
            PercussiveEnvelope::body(settings.decay),
            Shaper::new(settings.shaper, resources.curve, settings.algorithm),
            body_schedule,
        );

        let click = ClickNode::new(
            resources.noise,
            SVFilter::lowpass(settings.click_lowpass),
            SVFilter::highpass(settings.click_highpass),
            PercussiveEnvelope::click(settings.click_level, settings.click_decay),
            click_schedule,
            sample_rate,
        );

        Self {
            id,
            state: VoiceState::Scheduled,
            start_frame: body_schedule.start_frame(),
            end_frame: body_schedule.stop_frame().max(click_schedule.stop_frame()),
            body,
            click,
            scratch: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn id(&self) -> VoiceId {
        self.id
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }

    /// Frame at which both sources have stopped.
    pub fn end_frame(&self) -> u64 {
        self.end_frame
    }
}

impl GraphNode for Voice {
    /// Render the voice, overwriting `out`. `out` must not exceed
    /// `MAX_BLOCK_SIZE` frames.
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        debug_assert!(out.len() <= MAX_BLOCK_SIZE);

        if self.state == VoiceState::Completed {
            out.fill(0.0);
            return;
        }

        let block_end = ctx.frame + out.len() as u64;
        if self.state == VoiceState::Scheduled && block_end > self.start_frame {
            self.state = VoiceState::Playing;
        }

        self.body.render_block(out, ctx);

        let len = out.len().min(self.scratch.len());
        let click = &mut self.scratch[..len];
        self.click.render_block(click, ctx);
        sum_in_place(&mut out[..len], click);

        if !self.body.is_active() && !self.click.is_active() {
            self.release();
        }
    }

    fn is_active(&self) -> bool {
        self.state != VoiceState::Completed
    }

    fn release(&mut self) -> bool {
        let body = self.body.release();
        let click = self.click.release();
        self.state = VoiceState::Completed;
        body || click
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::noise::{NoiseGenerator, NoiseKind};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SR: f32 = 48_000.0;

    fn settings() -> VoiceSettings {
        VoiceSettings {
            tune: 50.0,
            punch: 150.0,
            pitch_decay: 0.05,
            decay: 0.2,
            waveform: OscillatorWaveform::Sine,
            shaper: ShaperKind::Curve,
            algorithm: DistortionAlgorithm::SoftClip,
            click_level: 0.8,
            click_decay: 0.02,
            click_lowpass: 3_000.0,
            click_highpass: 300.0,
        }
    }

    fn resources() -> VoiceResources {
        let noise = NoiseGenerator::new(StdRng::seed_from_u64(1)).generate(NoiseKind::White, 0.5, SR);
        VoiceResources {
            curve: Arc::new(LookupTable::build(0.5, 0.5, 4096)),
            noise: Arc::new(noise),
        }
    }

    #[test]
    fn lifecycle_runs_to_completion() {
        let mut voice = Voice::new(VoiceId(1), &settings(), resources(), 0.01, SR);
        assert_eq!(voice.state(), VoiceState::Scheduled);
        assert_eq!(voice.start_frame(), 480);

        let mut out = vec![0.0; 256];
        voice.render_block(&mut out, &RenderCtx::new(SR, 0));
        assert_eq!(voice.state(), VoiceState::Scheduled);
        assert!(out.iter().all(|&x| x == 0.0));

        let mut frame = 256;
        while voice.is_active() {
            voice.render_block(&mut out, &RenderCtx::new(SR, frame));
            assert!(out.iter().all(|x| x.is_finite()));
            frame += 256;
        }

        assert_eq!(voice.state(), VoiceState::Completed);
        assert!(frame >= voice.end_frame());
        // Completion already disconnected every node
        assert!(!voice.release());
    }

    #[test]
    fn lifetime_covers_longer_source() {
        let mut s = settings();
        assert!((s.lifetime() - 0.3).abs() < 1e-6);

        s.decay = 0.01;
        s.click_decay = 0.5;
        assert!((s.lifetime() - 0.55).abs() < 1e-6);
    }

    #[test]
    fn early_release_silences_and_is_idempotent() {
        let mut voice = Voice::new(VoiceId(2), &settings(), resources(), 0.0, SR);
        let mut out = vec![0.0; 128];
        voice.render_block(&mut out, &RenderCtx::new(SR, 0));
        assert_eq!(voice.state(), VoiceState::Playing);

        assert!(voice.release());
        assert!(!voice.release());

        voice.render_block(&mut out, &RenderCtx::new(SR, 128));
        assert!(out.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn display_id() {
        assert_eq!(VoiceId(42).to_string(), "voice#42");
    }
}
