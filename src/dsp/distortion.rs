//! Distortion / Waveshaping
//!
//! Distortion adds harmonics by reshaping the waveform. The kick body goes
//! through one of two interchangeable shapers, both implementing
//! [`Waveshaper`]:
//!
//! - [`CurveShaper`] runs the signal through a precomputed [`LookupTable`]
//!   with 4× oversampled evaluation.
//! - [`AlgorithmicShaper`] computes a [`DistortionAlgorithm`] per sample.
//!
//! Both pre-gain the input, crossfade the shaped ("wet") signal against the
//! untouched ("dry") input by `mix`, and hard-limit the result to [-1, 1].
//!
//! # Drive
//!
//! The user-facing `drive` knob (0-200) maps to a pre-gain:
//!
//!   gain = max(1, 1 + (drive / 100)² × 5)
//!
//! ```text
//!     0 → 1.0   (unity)
//!    40 → 1.8
//!   100 → 6.0
//!   150 → 12.25
//! ```
//!
//! The square law keeps the low end of the knob subtle.
//!
//! # Algorithms
//!
//! Soft Clip:  tanh(x × character). Smooth, warm saturation.
//!
//! Hard Clip:  clamp(x, ±1 / max(0.1, character)). Harsh, buzzy; higher
//!             character lowers the ceiling.
//!
//! Foldback:   once |x| passes 1 the signal is reflected,
//!             |x| → ||x| - 2·character| - 1, with the sign restored.
//!             Metallic, complex harmonics.

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::curve::LookupTable;
use crate::dsp::mix::blend_dry_wet;

/// Number of sub-samples the curve shaper evaluates per input sample.
pub const OVERSAMPLE: usize = 4;

/// Lowest character the hard clipper divides by.
const MIN_CLIP_CHARACTER: f32 = 0.1;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistortionAlgorithm {
    #[default]
    SoftClip,
    HardClip,
    Foldback,
}

impl DistortionAlgorithm {
    /// Decode the numeric `algoType` parameter (rounded; out of range clamps).
    pub fn from_index(value: f32) -> Self {
        match value.round() as i32 {
            i32::MIN..=0 => Self::SoftClip,
            1 => Self::HardClip,
            _ => Self::Foldback,
        }
    }

    pub fn index(self) -> f32 {
        match self {
            Self::SoftClip => 0.0,
            Self::HardClip => 1.0,
            Self::Foldback => 2.0,
        }
    }
}

/// Which strategy shapes the kick body.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShaperKind {
    #[default]
    Curve,
    Algorithmic,
}

/// Live shaping parameters, read once per block by the render thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeParams {
    /// Pre-gain, usually from [`drive_to_gain`].
    pub gain: f32,
    /// Wet/dry balance: 0.0 = dry, 1.0 = wet.
    pub mix: f32,
    /// Algorithm-specific character (algorithmic shaper only).
    pub character: f32,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            gain: 1.0,
            mix: 1.0,
            character: 0.5,
        }
    }
}

/// Map the 0-200 drive knob onto a pre-gain of at least 1.
#[inline]
pub fn drive_to_gain(drive: f32) -> f32 {
    let d = drive / 100.0;
    (1.0 + d * d * 5.0).max(1.0)
}

/// Soft clipping: tanh(sample × character).
#[inline]
pub fn soft_clip(sample: f32, character: f32) -> f32 {
    (sample * character).tanh()
}

/// Hard clipping at ±1 / max(0.1, character).
#[inline]
pub fn hard_clip(sample: f32, character: f32) -> f32 {
    let threshold = 1.0 / character.max(MIN_CLIP_CHARACTER);
    sample.clamp(-threshold, threshold)
}

/// Foldback: reflect samples that leave [-1, 1].
#[inline]
pub fn foldback(sample: f32, character: f32) -> f32 {
    let magnitude = sample.abs();
    if magnitude <= 1.0 {
        return sample;
    }

    let folded = (magnitude - 2.0 * character).abs() - 1.0;
    folded * sample.signum()
}

/// Apply one algorithm to a single sample.
#[inline]
pub fn distort(sample: f32, algorithm: DistortionAlgorithm, character: f32) -> f32 {
    match algorithm {
        DistortionAlgorithm::SoftClip => soft_clip(sample, character),
        DistortionAlgorithm::HardClip => hard_clip(sample, character),
        DistortionAlgorithm::Foldback => foldback(sample, character),
    }
}

/// Final safety limiter.
#[inline]
pub fn limit(sample: f32) -> f32 {
    if sample.is_nan() {
        0.0
    } else {
        sample.clamp(-1.0, 1.0)
    }
}

/// Shared interface of the two distortion strategies.
pub trait Waveshaper: Send {
    fn shape(&mut self, sample: f32, params: &ShapeParams) -> f32;

    fn reset(&mut self) {}

    /// Shape a whole buffer in place.
    fn shape_buffer(&mut self, buffer: &mut [f32], params: &ShapeParams) {
        for sample in buffer.iter_mut() {
            *sample = self.shape(*sample, params);
        }
    }
}

/// Curve-lookup strategy.
pub struct CurveShaper {
    table: Arc<LookupTable>,
    previous: f32,
}

impl CurveShaper {
    pub fn new(table: Arc<LookupTable>) -> Self {
        Self {
            table,
            previous: 0.0,
        }
    }

    pub fn table(&self) -> &Arc<LookupTable> {
        &self.table
    }
}

impl Waveshaper for CurveShaper {
    /// Linearly upsample between the previous and current gained input,
    /// evaluate the curve at each sub-sample and average them back down.
    fn shape(&mut self, sample: f32, params: &ShapeParams) -> f32 {
        let gained = sample * params.gain.max(1.0);

        let mut acc = 0.0;
        for k in 1..=OVERSAMPLE {
            let t = k as f32 / OVERSAMPLE as f32;
            let sub = self.previous + (gained - self.previous) * t;
            acc += self.table.lookup(sub);
        }
        self.previous = gained;

        let wet = acc / OVERSAMPLE as f32;
        limit(blend_dry_wet(sample, wet, params.mix.clamp(0.0, 1.0)))
    }

    fn reset(&mut self) {
        self.previous = 0.0;
    }
}

/// Per-sample algorithmic strategy.
pub struct AlgorithmicShaper {
    algorithm: DistortionAlgorithm,
}

impl AlgorithmicShaper {
    pub fn new(algorithm: DistortionAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> DistortionAlgorithm {
        self.algorithm
    }
}

impl Waveshaper for AlgorithmicShaper {
    fn shape(&mut self, sample: f32, params: &ShapeParams) -> f32 {
        let wet = limit(distort(sample * params.gain, self.algorithm, params.character));
        limit(blend_dry_wet(sample, wet, params.mix.clamp(0.0, 1.0)))
    }
}

/// A shaper selected at run time.
pub enum Shaper {
    Curve(CurveShaper),
    Algorithmic(AlgorithmicShaper),
}

impl Shaper {
    pub fn new(kind: ShaperKind, table: Arc<LookupTable>, algorithm: DistortionAlgorithm) -> Self {
        match kind {
            ShaperKind::Curve => Shaper::Curve(CurveShaper::new(table)),
            ShaperKind::Algorithmic => Shaper::Algorithmic(AlgorithmicShaper::new(algorithm)),
        }
    }

    pub fn kind(&self) -> ShaperKind {
        match self {
            Shaper::Curve(_) => ShaperKind::Curve,
            Shaper::Algorithmic(_) => ShaperKind::Algorithmic,
        }
    }
}

impl Waveshaper for Shaper {
    #[inline]
    fn shape(&mut self, sample: f32, params: &ShapeParams) -> f32 {
        match self {
            Shaper::Curve(s) => s.shape(sample, params),
            Shaper::Algorithmic(s) => s.shape(sample, params),
        }
    }

    fn reset(&mut self) {
        match self {
            Shaper::Curve(s) => s.reset(),
            Shaper::Algorithmic(s) => s.reset(),
        }
    }
}
