use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
State-Variable Filter (TPT)
===========================

The click layer band-limits its noise with a lowpass followed by a highpass.
Both are this topology-preserving-transform state-variable filter, which
computes all responses from the same two integrators:

| response  | passes          | rejects      |
| --------- | --------------- | ------------ |
| low-pass  | below cutoff    | above cutoff |
| high-pass | above cutoff    | below cutoff |
| band-pass | around cutoff   | both sides   |

Coefficients
------------

    g = tan(π · cutoff / sample_rate)      (prewarped integrator gain)
    k = 1 / Q                              (damping)

With Q = 1 the response has a gentle bump at the cutoff, which gives the
click a little "snap". Q = 0.707 would be maximally flat.

The cutoff is kept below 0.49 × sample_rate because tan() blows up at
Nyquist.

Coefficients are computed once in `prepare()`; a voice's cutoffs are latched
at trigger time, so there's nothing to recompute per sample.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
    BandPass,
}

pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    cutoff_hz: f32,
    q: f32,
    filter_type: FilterType,

    g: f32,
    k: f32,
}

impl SVFilter {
    pub fn new(filter_type: FilterType, cutoff_hz: f32, q: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz,
            q: q.max(0.05),
            filter_type,
            g: 0.0,
            k: 1.0,
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::LowPass, cutoff_hz, 1.0)
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::HighPass, cutoff_hz, 1.0)
    }

    pub fn bandpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::BandPass, cutoff_hz, 1.0)
    }

    /// Compute coefficients for `sample_rate`. Must be called before
    /// processing and again whenever cutoff or Q change.
    pub fn prepare(&mut self, sample_rate: f32) {
        let cutoff = self.cutoff_hz.clamp(1.0, sample_rate * 0.49);
        self.g = (PI * cutoff / sample_rate).tan();
        self.k = 1.0 / self.q;
    }

    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let g = self.g;
        let k = self.k;

        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        match self.filter_type {
            FilterType::LowPass => v2,
            FilterType::HighPass => sample - k * v1 - v2,
            FilterType::BandPass => v1,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn set_cutoff(&mut self, cutoff: f32, sample_rate: f32) {
        self.cutoff_hz = cutoff;
        self.prepare(sample_rate);
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }
}
