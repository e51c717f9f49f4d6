//! Low-level DSP primitives used by the per-voice graph nodes.
//!
//! These components are allocation-free once constructed and realtime-safe,
//! making them safe to embed directly inside voice structs. They stay focused
//! on the signal-processing math; scheduling and lifecycle live in `graph`
//! and `engine`.

/// Precomputed waveshaping lookup tables.
pub mod curve;
/// Curve-lookup and algorithmic distortion strategies.
pub mod distortion;
/// Gated attack/decay/sustain/release envelope generator.
pub mod envelope;
/// State-variable filter for band-limiting the click.
pub mod filter;
/// Summing and wet/dry crossfades.
pub mod mix;
/// White and pink noise buffers.
pub mod noise;
/// Body oscillator waveforms.
pub mod oscillator;
/// One-shot amplitude envelopes and pitch sweeps.
pub mod percussive;
/// One-pole smoothing for live parameters.
pub mod smoother;

pub use envelope::EnvelopeState;
pub use percussive::PercussiveStage;
