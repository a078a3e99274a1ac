use crate::timeline::Pitch;

/// Context passed to graph nodes during rendering
///
/// Contains information about what to render:
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - frequency: Pitch to render (Hz)
/// - level: Output gain requested by the voice (0.0-1.0)
pub struct RenderCtx {
    pub sample_rate: f32,
    pub frequency: f32,
    pub level: f32,
}

impl RenderCtx {
    /// Create context for a keyboard pitch
    pub fn from_pitch(sample_rate: f32, pitch: Pitch, level: f32) -> Self {
        Self {
            sample_rate,
            frequency: pitch.frequency(),
            level,
        }
    }

    /// Create context from a direct frequency (tests, benchmarks)
    pub fn from_freq(sample_rate: f32, frequency: f32, level: f32) -> Self {
        Self {
            sample_rate,
            frequency,
            level,
        }
    }
}

/// Core trait for audio processing graph nodes
///
/// Nodes render audio blocks and respond to the start and release of a voice.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Triggered when a voice starts sounding
    fn note_on(&mut self, _ctx: &RenderCtx) {}

    /// Triggered when a voice is asked to fade out
    fn note_off(&mut self, _ctx: &RenderCtx) {}

    fn envelope_level(&self) -> Option<f32> {
        None
    }

    /// Check if this node is still producing sound
    ///
    /// Used by voice management to know when a voice can be freed.
    fn is_active(&self) -> bool {
        true
    }
}

/// Allow boxed graph nodes to be used as graph nodes (for dynamic dispatch)
impl GraphNode for Box<dyn GraphNode> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        (**self).render_block(out, ctx)
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        (**self).note_on(ctx)
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        (**self).note_off(ctx)
    }

    fn envelope_level(&self) -> Option<f32> {
        (**self).envelope_level()
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}
