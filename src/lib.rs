//! Synthesized kick drum engine.
//!
//! Everything is generated from oscillators, noise, envelopes and waveshaping;
//! no samples are involved. The crate is split the way the audio is split:
//!
//! - [`dsp`] holds the allocation-free primitives (envelopes, noise, curves,
//!   distortion, filters).
//! - [`graph`] assembles those primitives into per-voice nodes.
//! - [`engine`] owns the control-domain [`engine::KickEngine`] and the
//!   render-domain [`engine::KickRenderer`] that runs inside the audio callback.
//! - [`processor`] is the registration surface for block processors hosted by
//!   an external audio runtime.

pub mod dsp;
pub mod engine;
pub mod graph; // Per-voice node graph
pub mod processor; // Host-registered block processors

pub use engine::{
    AudioContext, Destination, EngineConfig, EngineError, KickEngine, KickParams, KickRenderer,
    ParamsUpdate, TriggerOutcome, VoiceId,
};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
