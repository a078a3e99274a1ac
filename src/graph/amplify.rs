use crate::{
    graph::node::{GraphNode, RenderCtx},
    MAX_BLOCK_SIZE,
};

/// `signal × modulator × gain`.
///
/// The modulator is normally an envelope, so the voice is active exactly as
/// long as the modulator is.
pub struct Amplify<N, M> {
    pub signal: N,
    pub modulator: M,
    gain: f32,
    temp_buffer: Vec<f32>,
}

impl<N, M> Amplify<N, M> {
    pub fn new(signal: N, modulator: M) -> Self {
        Self {
            signal,
            modulator,
            gain: 1.0,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Scale the output (0.0-1.0); the notepad runs voices at 0.25 so a
    /// handful of overlapping notes stays below full scale.
    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain.clamp(0.0, 1.0);
        self
    }
}

impl<N: GraphNode, M: GraphNode> GraphNode for Amplify<N, M> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.signal.render_block(out, ctx);

        // Slice temp buffer to match output size (RT-safe, no allocation)
        let frames = &mut self.temp_buffer[..out.len()];
        frames.fill(0.0);
        self.modulator.render_block(frames, ctx);

        let gain = self.gain * ctx.level;
        for (o, m) in out.iter_mut().zip(frames.iter()) {
            *o *= *m * gain;
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.signal.note_on(ctx);
        self.modulator.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.signal.note_off(ctx);
        self.modulator.note_off(ctx);
    }

    fn envelope_level(&self) -> Option<f32> {
        self.modulator.envelope_level()
    }

    fn is_active(&self) -> bool {
        self.modulator.is_active()
    }
}
