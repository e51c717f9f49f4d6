use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Body Oscillator
===============

The kick's body is a single low oscillator whose frequency is swept from
`tune + punch` down to `tune` by the pitch envelope. Because the frequency
changes every sample, the oscillator keeps a running PHASE rather than
computing `sin(2π f t)` directly:

    phase += frequency / sample_rate      (wrapped into [0, 1))
    out    = waveform(phase)

Computing sin(2π f t) with a moving f would jump around as f changes; the
accumulator integrates frequency instead, so the waveform stays continuous
through the sweep.

Waveforms
---------

  Sine      Pure fundamental. The classic 808 body.
  Triangle  Adds weak odd harmonics (1/n²). A little more "knock".

Both start at phase 0 with an output of 0, so a freshly triggered voice never
starts with a step.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OscillatorWaveform {
    #[default]
    Sine,
    Triangle,
}

pub struct Oscillator {
    waveform: OscillatorWaveform,
    phase: f32,
}

impl Oscillator {
    pub fn new(waveform: OscillatorWaveform) -> Self {
        Self { waveform, phase: 0.0 }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorWaveform::Sine)
    }

    pub fn triangle() -> Self {
        Self::new(OscillatorWaveform::Triangle)
    }

    /// Produce one sample at `frequency` and advance the phase.
    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let out = match self.waveform {
            OscillatorWaveform::Sine => (TAU * self.phase).sin(),
            OscillatorWaveform::Triangle => {
                let p = self.phase;
                if p < 0.25 {
                    4.0 * p
                } else if p < 0.75 {
                    2.0 - 4.0 * p
                } else {
                    4.0 * p - 4.0
                }
            }
        };

        self.phase += frequency / sample_rate;
        self.phase -= self.phase.floor();

        out
    }

    /// Fill `buffer` at a constant frequency.
    pub fn render(&mut self, buffer: &mut [f32], frequency: f32, sample_rate: f32) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(frequency, sample_rate);
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }
}
