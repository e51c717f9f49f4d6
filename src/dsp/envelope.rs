use crate::MIN_TIME;

/*
Gated ADSR Envelope
===================

This module implements a linear, gate-driven ADSR envelope. The kick voice
itself uses the one-shot percussive envelope (see `percussive.rs`); the ADSR
is used by the gated oscillator processor, where a host drives a `gate`
parameter high and low.

Vocabulary
----------

  level       The envelope's current output value (0.0 to 1.0).

  stage       Idle, Attack, Decay, Sustain or Release.

  gate        The note on/off signal. A rising edge starts Attack, a falling
              edge starts Release.

  elapsed     Samples spent in the current stage. Every stage is a straight
              line over a fixed number of samples, so we interpolate from the
              stage's start level by elapsed / total.


The Shape: Linear Ramps
-----------------------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release

All four stages are LINEAR. The decay stage interpolates from 1.0 straight
down to the sustain level; this is deliberately a different curve from the
exponential decay of the percussive envelope.


Retriggering
------------

A rising edge while the envelope is still sounding restarts Attack from the
CURRENT level, not from zero:

    attack level = start + (1 - start) * elapsed / attack_samples

Jumping to zero would put a step in the output, which is an audible click.


The State Machine
-----------------

    Idle ──gate↑──→ Attack ──level=1──→ Decay ──level=S──→ Sustain
      ↑               │                   │                  │
      │               └──────gate↓────────┴──────────────────┘
      │                                   ↓
      └──────────level=0────────────── Release

note_off triggers Release from any sounding stage. Release starts from the
level at that moment and reaches exactly 0.0 after `release` seconds.
*/

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // Gate low, envelope inactive, level = 0
    Attack,  // Gate just went high, ramping up to 1.0
    Decay,   // Reached peak, ramping down to sustain level
    Sustain, // Holding at sustain level while gate is high
    Release, // Gate went low, ramping down to 0
}

pub struct Envelope {
    sample_rate: f32,

    attack_time: f32,
    decay_time: f32,
    sustain_level: f32,
    release_time: f32,

    stage: EnvelopeState,
    level: f32,
    gate: bool,

    // Level at the start of the current stage and samples spent in it
    stage_start_level: f32,
    stage_elapsed: u32,
    stage_total: u32,
}

impl Envelope {
    pub fn new(sample_rate: f32) -> Self {
        Self::adsr(sample_rate, 0.01, 0.1, 0.7, 0.3)
    }

    pub fn adsr(sample_rate: f32, attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        let mut env = Self {
            sample_rate,
            attack_time: MIN_TIME,
            decay_time: MIN_TIME,
            sustain_level: 0.0,
            release_time: MIN_TIME,

            stage: EnvelopeState::Idle,
            level: 0.0,
            gate: false,

            stage_start_level: 0.0,
            stage_elapsed: 0,
            stage_total: 1,
        };
        env.set_params(attack, decay, sustain, release);
        env
    }

    /// Update the stage times and sustain level. Takes effect at the next
    /// stage transition; a ramp in progress keeps its length.
    pub fn set_params(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.attack_time = attack.max(MIN_TIME);
        self.decay_time = decay.max(MIN_TIME);
        self.sustain_level = sustain.clamp(0.0, 1.0);
        self.release_time = release.max(MIN_TIME);
    }

    /// Drive the gate; only edges change the stage.
    pub fn set_gate(&mut self, high: bool) {
        if high && !self.gate {
            self.note_on();
        } else if !high && self.gate {
            self.note_off();
        }
    }

    /// Gate high: start the attack from the current level.
    pub fn note_on(&mut self) {
        self.gate = true;
        self.enter(EnvelopeState::Attack, self.attack_time);
    }

    /// Gate low: start the release phase from current level.
    pub fn note_off(&mut self) {
        self.gate = false;
        if matches!(self.stage, EnvelopeState::Idle) {
            return;
        }
        self.enter(EnvelopeState::Release, self.release_time);
    }

    fn enter(&mut self, stage: EnvelopeState, seconds: f32) {
        self.stage = stage;
        self.stage_start_level = self.level;
        self.stage_elapsed = 0;
        self.stage_total = self.samples_for(seconds);
    }

    fn samples_for(&self, seconds: f32) -> u32 {
        (seconds * self.sample_rate).round().max(1.0) as u32
    }

    /// Advance the envelope by one sample and return the new level.
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                self.stage_elapsed += 1;
                if self.stage_elapsed >= self.stage_total {
                    self.level = 1.0;
                    self.enter(EnvelopeState::Decay, self.decay_time);
                } else {
                    let progress = self.stage_elapsed as f32 / self.stage_total as f32;
                    self.level = self.stage_start_level + (1.0 - self.stage_start_level) * progress;
                }
            }

            EnvelopeState::Decay => {
                self.stage_elapsed += 1;
                if self.stage_elapsed >= self.stage_total {
                    self.level = self.sustain_level;
                    self.stage = EnvelopeState::Sustain;
                } else {
                    let progress = self.stage_elapsed as f32 / self.stage_total as f32;
                    self.level = 1.0 - (1.0 - self.sustain_level) * progress;
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.sustain_level;
            }

            EnvelopeState::Release => {
                self.stage_elapsed += 1;
                if self.stage_elapsed >= self.stage_total {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                } else {
                    let progress = self.stage_elapsed as f32 / self.stage_total as f32;
                    self.level = self.stage_start_level * (1.0 - progress);
                }
            }
        }

        self.level = self.level.clamp(0.0, 1.0);
        self.level
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Returns true if the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeState::Idle)
    }

    /// Reset to idle state.
    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.gate = false;
        self.stage_start_level = 0.0;
        self.stage_elapsed = 0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn render_samples(env: &mut Envelope, samples: usize) {
        for _ in 0..samples {
            env.next_sample();
        }
    }

    #[test]
    fn attack_reaches_full_level() {
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.01, 0.1, 0.7, 0.2);

        env.note_on();
        render_samples(&mut env, 10);

        assert_eq!(env.level(), 1.0);
        assert_eq!(env.state(), EnvelopeState::Decay);
    }

    #[test]
    fn sustain_is_reached_exactly_and_held() {
        let sustain = 0.6;
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.01, 0.05, sustain, 0.2);

        env.note_on();
        render_samples(&mut env, 10 + 50);

        assert_eq!(env.state(), EnvelopeState::Sustain);
        assert_eq!(env.level(), sustain);

        render_samples(&mut env, 500);
        assert_eq!(env.level(), sustain);
    }

    #[test]
    fn decay_is_linear() {
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.01, 0.1, 0.0, 0.2);
        env.note_on();
        render_samples(&mut env, 10);

        // Halfway through a 100-sample decay from 1.0 to 0.0
        render_samples(&mut env, 50);
        assert!((env.level() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn release_falls_linearly_to_zero() {
        let release = 0.03;
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.01, 0.05, 0.5, release);

        env.note_on();
        render_samples(&mut env, 100);
        assert_eq!(env.level(), 0.5);

        env.note_off();
        render_samples(&mut env, 15);
        assert!((env.level() - 0.25).abs() < 1e-5);

        render_samples(&mut env, 15);
        assert_eq!(env.level(), 0.0);
        assert_eq!(env.state(), EnvelopeState::Idle);
    }

    #[test]
    fn retrigger_starts_from_current_level() {
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.01, 0.05, 0.5, 0.1);
        env.note_on();
        render_samples(&mut env, 100);
        env.note_off();
        render_samples(&mut env, 50);
        let before = env.level();
        assert!(before > 0.0);

        env.note_on();
        let first = env.next_sample();
        assert!(first >= before, "retrigger dropped from {before} to {first}");
        assert!(first - before < 0.1);
    }

    #[test]
    fn gate_edges_drive_stages() {
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.01, 0.01, 0.5, 0.01);
        env.set_gate(false);
        assert_eq!(env.state(), EnvelopeState::Idle);

        env.set_gate(true);
        assert_eq!(env.state(), EnvelopeState::Attack);
        render_samples(&mut env, 5);

        // Holding the gate high is not a new edge
        env.set_gate(true);
        assert_eq!(env.state(), EnvelopeState::Attack);

        env.set_gate(false);
        assert_eq!(env.state(), EnvelopeState::Release);
    }

    #[test]
    fn note_off_while_idle_is_ignored() {
        let mut env = Envelope::new(SAMPLE_RATE);
        env.note_off();
        assert_eq!(env.state(), EnvelopeState::Idle);
        assert!(!env.is_active());
    }
}
