use crate::dsp::distortion::ShapeParams;

/// Context passed to graph nodes during rendering
///
/// Contains information about what to render:
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - frame: Absolute audio-clock frame of the first sample in the block
/// - shape: Live distortion parameters for this block
pub struct RenderCtx {
    pub sample_rate: f32,
    pub frame: u64,
    pub shape: ShapeParams,
}

impl RenderCtx {
    pub fn new(sample_rate: f32, frame: u64) -> Self {
        Self {
            sample_rate,
            frame,
            shape: ShapeParams::default(),
        }
    }

    pub fn with_shape(mut self, shape: ShapeParams) -> Self {
        self.shape = shape;
        self
    }

    /// Audio-clock time of the first sample in the block, in seconds.
    pub fn time(&self) -> f64 {
        self.frame as f64 / self.sample_rate as f64
    }
}

/// Convert an audio-clock time in seconds to the nearest frame.
#[inline]
pub fn seconds_to_frames(seconds: f64, sample_rate: f32) -> u64 {
    (seconds.max(0.0) * sample_rate as f64).round() as u64
}

/// Core trait for per-voice processing nodes
///
/// Nodes render audio into a block and report when they have nothing left
/// to play. Rendering overwrites `out`.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Check if this node is still producing sound
    ///
    /// Used by the renderer to know when a voice can be handed back.
    fn is_active(&self) -> bool {
        true
    }

    /// Disconnect the node: it renders silence from now on.
    ///
    /// Returns `true` only the first time. Releasing again is a no-op.
    fn release(&mut self) -> bool;
}

/// Allow boxed graph nodes to be used as graph nodes (for dynamic dispatch)
impl GraphNode for Box<dyn GraphNode> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        (**self).render_block(out, ctx)
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }

    fn release(&mut self) -> bool {
        (**self).release()
    }
}
