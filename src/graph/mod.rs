//! Per-voice processing graph.
//!
//! A voice is a small fixed graph of two source paths (body and click) summed
//! into a mix. The nodes wrap the `dsp` primitives with absolute-time
//! scheduling and idempotent release so the renderer can treat a whole hit
//! as one `GraphNode`.

/// Oscillator, pitch sweep, amplitude envelope and shaper.
pub mod body;
/// Filtered noise transient.
pub mod click;
/// Core traits shared by all graph nodes.
pub mod node;
/// Absolute start/stop windows on the audio clock.
pub mod schedule;
/// One triggered hit: body + click.
pub mod voice;

pub use node::{GraphNode, RenderCtx};
pub use voice::{Voice, VoiceId, VoiceResources, VoiceSettings, VoiceState};
