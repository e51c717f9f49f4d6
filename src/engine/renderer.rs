use std::sync::Arc;

use rtrb::{Consumer, Producer, PushError};

use crate::dsp::mix::{apply_gain_ramp, sum_in_place};
use crate::dsp::smoother::ParamSmoother;
use crate::engine::context::{AudioClock, MAX_PORTS};
use crate::engine::message::{EndReason, LiveParams, RenderCommand, RenderEvent};
use crate::graph::{GraphNode, RenderCtx, Voice};
use crate::MAX_BLOCK_SIZE;

/*
Render Loop
===========

The renderer is the only thing that runs on the audio thread. Per block of
at most MAX_BLOCK_SIZE frames:

  1. drain commands   start / release voices, new live targets, routing
  2. smooth           advance each live parameter one block toward its target
  3. render voices    every voice overwrites a scratch buffer, summed into mix
  4. master gain      linear ramp from the previous block's gain to this one's
  5. hand back        finished voices go up the event queue to be dropped
  6. advance clock

No step allocates, locks or logs. Voice storage is reserved up front for
`max_voices`; starting a voice beyond that steals the oldest one.

Voices are never dropped here: a finished voice (its Vec and Arcs included)
is pushed back to the control domain inside `RenderEvent::Ended`. If that
queue is full the voice waits in `returning` and is retried next block.
*/

pub struct KickRenderer {
    sample_rate: f32,
    clock: Arc<AudioClock>,
    commands: Consumer<RenderCommand>,
    events: Producer<RenderEvent>,

    voices: Vec<Box<Voice>>,
    max_voices: usize,
    returning: Vec<(Box<Voice>, EndReason)>,
    routes: u8,

    output_gain: ParamSmoother,
    pre_gain: ParamSmoother,
    mix: ParamSmoother,
    character: ParamSmoother,

    mix_buffer: Vec<f32>,
    voice_buffer: Vec<f32>,
}

impl KickRenderer {
    pub(crate) fn new(
        sample_rate: f32,
        clock: Arc<AudioClock>,
        commands: Consumer<RenderCommand>,
        events: Producer<RenderEvent>,
        max_voices: usize,
        live: LiveParams,
        smoothing_time: f32,
        routes: u8,
    ) -> Self {
        Self {
            sample_rate,
            clock,
            commands,
            events,
            voices: Vec::with_capacity(max_voices),
            max_voices,
            returning: Vec::with_capacity(max_voices * 2),
            routes,
            output_gain: ParamSmoother::new(live.output_gain, smoothing_time),
            pre_gain: ParamSmoother::new(live.pre_gain, smoothing_time),
            mix: ParamSmoother::new(live.mix, smoothing_time),
            character: ParamSmoother::new(live.character, smoothing_time),
            mix_buffer: vec![0.0; MAX_BLOCK_SIZE],
            voice_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Voices currently held by the renderer.
    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Current (smoothed) master gain.
    pub fn output_gain(&self) -> f32 {
        self.output_gain.value()
    }

    /// Render one callback's worth of audio and add it into every connected
    /// port. `outputs[n]` is port `n`; ports beyond the slice are skipped.
    /// The number of frames is the length of the shortest output, or of
    /// `outputs[0]` if there is only one.
    pub fn process(&mut self, outputs: &mut [&mut [f32]]) {
        let frames = outputs.iter().map(|o| o.len()).min().unwrap_or(0);

        let mut offset = 0;
        while offset < frames {
            let len = (frames - offset).min(MAX_BLOCK_SIZE);
            self.render_chunk(len);

            let mixed = &self.mix_buffer[..len];
            for (port, output) in outputs.iter_mut().enumerate() {
                if port < MAX_PORTS as usize && self.routes & (1 << port) != 0 {
                    sum_in_place(&mut output[offset..offset + len], mixed);
                }
            }
            offset += len;
        }
    }

    /// Render into the host output (port 0), overwriting `out`.
    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        self.process(&mut [out]);
    }

    /// Render `frames` frames without writing anywhere.
    pub fn skip(&mut self, frames: usize) {
        let mut offset = 0;
        while offset < frames {
            let len = (frames - offset).min(MAX_BLOCK_SIZE);
            self.render_chunk(len);
            offset += len;
        }
    }

    fn render_chunk(&mut self, len: usize) {
        self.drain_commands();

        let frame = self.clock.frame();
        let (gain_start, gain_end) = self.output_gain.advance_block(len, self.sample_rate);
        let dt = len as f32 / self.sample_rate;
        let live = LiveParams {
            output_gain: gain_end,
            pre_gain: self.pre_gain.advance(dt),
            mix: self.mix.advance(dt),
            character: self.character.advance(dt),
        };
        let ctx = RenderCtx::new(self.sample_rate, frame).with_shape(live.shape());

        let mixed = &mut self.mix_buffer[..len];
        mixed.fill(0.0);

        let mut i = 0;
        while i < self.voices.len() {
            let voice = &mut self.voices[i];
            let scratch = &mut self.voice_buffer[..len];
            voice.render_block(scratch, &ctx);
            sum_in_place(mixed, scratch);

            if voice.is_active() {
                i += 1;
            } else {
                let voice = self.voices.swap_remove(i);
                Self::hand_back(&mut self.returning, voice, EndReason::Completed);
            }
        }

        apply_gain_ramp(mixed, gain_start, gain_end);

        self.flush_returning();
        self.clock.advance(len as u64);
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.pop() {
            match command {
                RenderCommand::Start(voice) => {
                    if self.voices.len() >= self.max_voices {
                        self.steal_oldest();
                    }
                    self.voices.push(voice);
                }
                RenderCommand::Release(id) => {
                    if let Some(index) = self.voices.iter().position(|v| v.id() == id) {
                        let mut voice = self.voices.swap_remove(index);
                        voice.release();
                        Self::hand_back(&mut self.returning, voice, EndReason::Released);
                    }
                }
                RenderCommand::ReleaseAll => {
                    while let Some(mut voice) = self.voices.pop() {
                        voice.release();
                        Self::hand_back(&mut self.returning, voice, EndReason::Released);
                    }
                }
                RenderCommand::Live(live) => {
                    self.output_gain.set_target(live.output_gain);
                    self.pre_gain.set_target(live.pre_gain);
                    self.mix.set_target(live.mix);
                    self.character.set_target(live.character);
                }
                RenderCommand::Routes(routes) => self.routes = routes,
            }
        }
    }

    fn steal_oldest(&mut self) {
        let oldest = self
            .voices
            .iter()
            .enumerate()
            .min_by_key(|(_, v)| v.start_frame())
            .map(|(index, _)| index);

        if let Some(index) = oldest {
            let mut voice = self.voices.swap_remove(index);
            voice.release();
            Self::hand_back(&mut self.returning, voice, EndReason::Stolen);
        }
    }

    fn hand_back(returning: &mut Vec<(Box<Voice>, EndReason)>, voice: Box<Voice>, reason: EndReason) {
        if returning.len() < returning.capacity() {
            returning.push((voice, reason));
        }
        // Otherwise the control domain has stopped polling; dropping here is
        // the only option left.
    }

    fn flush_returning(&mut self) {
        while let Some((voice, reason)) = self.returning.pop() {
            if let Err(PushError::Full(RenderEvent::Ended { voice, reason })) =
                self.events.push(RenderEvent::Ended { voice, reason })
            {
                self.returning.push((voice, reason));
                break;
            }
        }
    }
}
