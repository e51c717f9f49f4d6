//! White and pink noise buffers for the click transient.

use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Noise
=====

The click layer needs a few milliseconds of broadband noise per hit. Rather
than running a random generator on the render thread, noise is rendered once
into a fixed buffer on the control thread and every voice reads it (looping)
through its own cursor. The buffer is immutable once built; regenerating it
builds a new buffer and swaps the shared reference.

White Noise
-----------

Every sample is independently uniform in [-1, 1]. Equal energy per Hz, so it
sounds bright and hissy.

Pink Noise
----------

Equal energy per OCTAVE: power falls off at 3 dB/octave (1/f). It sounds
darker and fuller than white noise, which gives the click more body.

We use Paul Kellet's "refined" method: white noise is fed through a bank of
one-pole lowpass filters with staggered corner frequencies and the outputs are
summed. Each pole covers roughly one region of the spectrum, and together they
approximate the -3 dB/octave slope within ±0.05 dB above ~10 Hz.

    b0 = 0.99886 * b0 + white * 0.0555179
    b1 = 0.99332 * b1 + white * 0.0750759
    b2 = 0.96900 * b2 + white * 0.1538520
    b3 = 0.86650 * b3 + white * 0.3104856
    b4 = 0.55000 * b4 + white * 0.5329522
    b5 = -0.7616 * b5 - white * 0.0168980
    pink = b0 + b1 + b2 + b3 + b4 + b5 + b6 + white * 0.5362
    b6 = white * 0.115926

The sum is scaled by 0.11 to land roughly in [-1, 1], then doubled to widen
the usable dynamic range and clamped so the buffer stays bounded.

Determinism
-----------

The generator owns its random source. Seed it (`StdRng::seed_from_u64`) and the
same seed always produces the same buffer, which is what tests rely on.
*/

const PINK_SCALE: f32 = 0.11;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseKind {
    #[default]
    White,
    Pink,
}

/// Paul Kellet's pink filter state.
#[derive(Debug, Default, Clone)]
pub struct PinkFilter {
    b: [f32; 7],
}

impl PinkFilter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn next(&mut self, white: f32) -> f32 {
        let b = &mut self.b;
        b[0] = 0.99886 * b[0] + white * 0.055_517_9;
        b[1] = 0.99332 * b[1] + white * 0.075_075_9;
        b[2] = 0.96900 * b[2] + white * 0.153_852;
        b[3] = 0.86650 * b[3] + white * 0.310_485_6;
        b[4] = 0.55000 * b[4] + white * 0.532_952_2;
        b[5] = -0.7616 * b[5] - white * 0.016_898;
        let pink = b[0] + b[1] + b[2] + b[3] + b[4] + b[5] + b[6] + white * 0.5362;
        b[6] = white * 0.115_926;

        (pink * PINK_SCALE * 2.0).clamp(-1.0, 1.0)
    }

    pub fn reset(&mut self) {
        self.b = [0.0; 7];
    }
}

/// A precomputed, read-only noise buffer shared between voices.
#[derive(Debug, Clone)]
pub struct NoiseBuffer {
    kind: NoiseKind,
    sample_rate: f32,
    samples: Vec<f32>,
}

impl NoiseBuffer {
    pub fn kind(&self) -> NoiseKind {
        self.kind
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Read sample `index`, wrapping around the end of the buffer.
    /// An empty buffer reads as silence.
    #[inline]
    pub fn looped(&self, index: usize) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples[index % self.samples.len()]
    }
}

/// Renders noise buffers from an injected random source.
pub struct NoiseGenerator<R: Rng> {
    rng: R,
}

impl<R: Rng> NoiseGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Render `duration_secs` of noise. Non-positive or non-finite durations
    /// produce an empty buffer.
    pub fn generate(&mut self, kind: NoiseKind, duration_secs: f32, sample_rate: f32) -> NoiseBuffer {
        let len = if duration_secs.is_finite() && duration_secs > 0.0 && sample_rate > 0.0 {
            (duration_secs * sample_rate) as usize
        } else {
            0
        };

        let mut samples = Vec::with_capacity(len);
        match kind {
            NoiseKind::White => {
                for _ in 0..len {
                    samples.push(self.white());
                }
            }
            NoiseKind::Pink => {
                let mut filter = PinkFilter::new();
                for _ in 0..len {
                    let white = self.white();
                    samples.push(filter.next(white));
                }
            }
        }

        NoiseBuffer {
            kind,
            sample_rate,
            samples,
        }
    }

    #[inline]
    fn white(&mut self) -> f32 {
        self.rng.gen_range(-1.0f32..=1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use rustfft::{num_complex::Complex, FftPlanner};

    fn generator(seed: u64) -> NoiseGenerator<StdRng> {
        NoiseGenerator::new(StdRng::seed_from_u64(seed))
    }

    /// Ratio of energy in the lowest sixteenth of the spectrum to the energy
    /// in the top half.
    fn low_high_ratio(samples: &[f32]) -> f32 {
        let n = samples.len();
        let mut spectrum: Vec<Complex<f32>> =
            samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
        FftPlanner::new().plan_fft_forward(n).process(&mut spectrum);

        let energy = |range: std::ops::Range<usize>| -> f32 {
            spectrum[range].iter().map(|c| c.norm_sqr()).sum()
        };
        energy(1..n / 32) / energy(n / 4..n / 2)
    }

    #[test]
    fn white_noise_is_bounded() {
        let buffer = generator(1).generate(NoiseKind::White, 0.5, 48_000.0);
        assert_eq!(buffer.len(), 24_000);
        assert!(buffer.samples().iter().all(|s| (-1.0..=1.0).contains(s)));
        assert!(buffer.samples().iter().any(|s| s.abs() > 0.5));
    }

    #[test]
    fn pink_noise_is_bounded() {
        let buffer = generator(2).generate(NoiseKind::Pink, 0.5, 48_000.0);
        assert!(buffer.samples().iter().all(|s| (-1.0..=1.0).contains(s)));
        assert!(buffer.samples().iter().any(|s| s.abs() > 0.05));
    }

    #[test]
    fn same_seed_same_buffer() {
        let a = generator(7).generate(NoiseKind::Pink, 0.1, 8_000.0);
        let b = generator(7).generate(NoiseKind::Pink, 0.1, 8_000.0);
        assert_eq!(a.samples(), b.samples());
    }

    #[test]
    fn non_positive_duration_is_empty() {
        let mut gen = generator(3);
        assert!(gen.generate(NoiseKind::White, 0.0, 48_000.0).is_empty());
        assert!(gen.generate(NoiseKind::Pink, -1.0, 48_000.0).is_empty());
        assert!(gen.generate(NoiseKind::White, f32::NAN, 48_000.0).is_empty());
    }

    #[test]
    fn empty_buffer_reads_silence() {
        let buffer = generator(3).generate(NoiseKind::White, 0.0, 48_000.0);
        assert_eq!(buffer.looped(17), 0.0);
    }

    #[test]
    fn looped_read_wraps() {
        let buffer = generator(4).generate(NoiseKind::White, 0.01, 1_000.0);
        assert_eq!(buffer.len(), 10);
        assert_eq!(buffer.looped(3), buffer.looped(13));
    }

    #[test]
    fn pink_concentrates_energy_at_low_frequencies() {
        let n = 16_384;
        let sample_rate = 16_384.0;
        let white = generator(11).generate(NoiseKind::White, 1.0, sample_rate);
        let pink = generator(11).generate(NoiseKind::Pink, 1.0, sample_rate);
        assert_eq!(white.len(), n);

        let white_ratio = low_high_ratio(white.samples());
        let pink_ratio = low_high_ratio(pink.samples());

        assert!(
            pink_ratio > white_ratio * 4.0,
            "pink={pink_ratio}, white={white_ratio}"
        );
    }
}
