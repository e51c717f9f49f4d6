use crate::dsp::distortion::ShapeParams;
use crate::graph::{Voice, VoiceId};

/// Control → render.
pub enum RenderCommand {
    /// Take ownership of a fully built voice.
    Start(Box<Voice>),
    /// Disconnect one voice early. Unknown ids are ignored.
    Release(VoiceId),
    /// Disconnect every voice.
    ReleaseAll,
    /// New live parameter targets.
    Live(LiveParams),
    /// Bitmask of connected output ports.
    Routes(u8),
}

/// Why a voice left the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Both sources ran past their stop time.
    Completed,
    /// The control domain asked for it.
    Released,
    /// Evicted to make room for a newer voice.
    Stolen,
}

/// Render → control.
pub enum RenderEvent {
    /// A voice has been released and is handed back for dropping.
    Ended { voice: Box<Voice>, reason: EndReason },
}

/// Parameters the render thread applies to voices already playing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveParams {
    pub output_gain: f32,
    pub pre_gain: f32,
    pub mix: f32,
    pub character: f32,
}

impl LiveParams {
    pub fn shape(&self) -> ShapeParams {
        ShapeParams {
            gain: self.pre_gain,
            mix: self.mix,
            character: self.character,
        }
    }
}
