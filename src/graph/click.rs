use std::sync::Arc;

use crate::dsp::filter::SVFilter;
use crate::dsp::noise::NoiseBuffer;
use crate::dsp::percussive::PercussiveEnvelope;
use crate::graph::node::{GraphNode, RenderCtx};
use crate::graph::schedule::SourceSchedule;

/// Noise transient layered over the body.
///
/// noise (looped) → low-pass → high-pass → click envelope.
pub struct ClickNode {
    noise: Arc<NoiseBuffer>,
    cursor: usize,
    lowpass: SVFilter,
    highpass: SVFilter,
    envelope: PercussiveEnvelope,
    schedule: SourceSchedule,
    finished: bool,
    released: bool,
}

impl ClickNode {
    pub fn new(
        noise: Arc<NoiseBuffer>,
        mut lowpass: SVFilter,
        mut highpass: SVFilter,
        envelope: PercussiveEnvelope,
        schedule: SourceSchedule,
        sample_rate: f32,
    ) -> Self {
        lowpass.prepare(sample_rate);
        highpass.prepare(sample_rate);
        Self {
            noise,
            cursor: 0,
            lowpass,
            highpass,
            envelope,
            schedule,
            finished: false,
            released: false,
        }
    }

    pub fn schedule(&self) -> SourceSchedule {
        self.schedule
    }

    pub fn noise(&self) -> &Arc<NoiseBuffer> {
        &self.noise
    }
}

impl GraphNode for ClickNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        out.fill(0.0);
        if self.released || self.finished {
            return;
        }

        if let Some(range) = self.schedule.active_range(ctx.frame, out.len()) {
            for i in range {
                let t = self.schedule.elapsed(ctx.frame + i as u64, ctx.sample_rate);
                let noise = self.noise.looped(self.cursor);
                self.cursor = self.cursor.wrapping_add(1);

                let filtered = self.highpass.process(self.lowpass.process(noise));
                out[i] = filtered * self.envelope.value_at(t);
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
        self.lowpass.reset();
        self.highpass.reset();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::noise::{NoiseGenerator, NoiseKind};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SR: f32 = 48_000.0;

    fn click(level: f32, decay: f32) -> ClickNode {
        let noise = NoiseGenerator::new(StdRng::seed_from_u64(7)).generate(NoiseKind::White, 0.01, SR);
        ClickNode::new(
            Arc::new(noise),
            SVFilter::lowpass(3_000.0),
            SVFilter::highpass(300.0),
            PercussiveEnvelope::click(level, decay),
            SourceSchedule::from_seconds(0.0, decay as f64, 0.05, SR),
            SR,
        )
    }

    #[test]
    fn renders_short_transient() {
        let mut node = click(0.8, 0.02);
        let mut out = vec![0.0; 256];
        let mut energy = 0.0;
        let mut frame = 0u64;

        while node.is_active() {
            node.render_block(&mut out, &RenderCtx::new(SR, frame));
            energy += out.iter().map(|x| x * x).sum::<f32>();
            frame += out.len() as u64;
        }

        assert!(energy > 0.0);
        // 0.02 s decay + 0.05 s margin, rounded up to a block
        assert!(frame >= (0.07 * SR) as u64 && frame < (0.07 * SR) as u64 + 256);
    }

    #[test]
    fn noise_loops_past_buffer_end() {
        // 10 ms buffer, 200 ms click: keeps sounding after the first wrap
        let mut node = click(1.0, 0.2);
        let mut out = vec![0.0; 960];
        node.render_block(&mut out, &RenderCtx::new(SR, 0));
        node.render_block(&mut out, &RenderCtx::new(SR, 960));
        assert!(out.iter().any(|&x| x != 0.0));
    }

    #[test]
    fn zero_level_is_silent() {
        let mut node = click(0.0, 0.02);
        let mut out = vec![0.0; 512];
        node.render_block(&mut out, &RenderCtx::new(SR, 0));
        assert!(out.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn release_twice_is_noop() {
        let mut node = click(0.8, 0.02);
        assert!(node.release());
        assert!(!node.release());
        assert!(!node.is_active());
    }
}
