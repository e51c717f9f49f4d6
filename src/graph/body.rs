use crate::dsp::distortion::{Shaper, Waveshaper};
use crate::dsp::oscillator::Oscillator;
use crate::dsp::percussive::{PercussiveEnvelope, PitchSweep};
use crate::graph::node::{GraphNode, RenderCtx};
use crate::graph::schedule::SourceSchedule;

/*
Body Path
=========

The low-frequency tone of the kick:

   oscillator ──► amplitude envelope ──► shaper ──► out
       ▲
       └── pitch sweep (tune + punch → tune over pitchDecay)

Every sample is evaluated at its elapsed time since the voice started, so
sweep and envelope stay sample-accurate no matter where block boundaries
fall. Only the oscillator and the shaper carry state between samples.

The shaper reads the live drive/mix/character from the render context, while
the waveform, shaper strategy and curve were latched when the voice was
created.
*/

pub struct BodyNode {
    oscillator: Oscillator,
    sweep: PitchSweep,
    envelope: PercussiveEnvelope,
    shaper: Shaper,
    schedule: SourceSchedule,
    finished: bool,
    released: bool,
}

impl BodyNode {
    pub fn new(
        oscillator: Oscillator,
        sweep: PitchSweep,
        envelope: PercussiveEnvelope,
        shaper: Shaper,
        schedule: SourceSchedule,
    ) -> Self {
        Self {
            oscillator,
            sweep,
            envelope,
            shaper,
            schedule,
            finished: false,
            released: false,
        }
    }

    pub fn schedule(&self) -> SourceSchedule {
        self.schedule
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl GraphNode for BodyNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        out.fill(0.0);
        if self.released || self.finished {
            return;
        }

        if let Some(range) = self.schedule.active_range(ctx.frame, out.len()) {
            let sr = ctx.sample_rate;
            for i in range {
                let t = self.schedule.elapsed(ctx.frame + i as u64, sr);
                let freq = self.sweep.frequency_at(t);
                let raw = self.oscillator.next_sample(freq, sr) * self.envelope.value_at(t);
                out[i] = self.shaper.shape(raw, &ctx.shape);
            }
        }

        self.finished = self.schedule.is_finished(ctx.frame + out.len() as u64);
    }

    fn is_active(&self) -> bool {
        !self.released && !self.finished
    }

    fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;
        self.shaper.reset();
        true
    }
}
