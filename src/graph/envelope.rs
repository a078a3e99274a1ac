use crate::{
    dsp::envelope::Envelope,
    graph::node::{GraphNode, RenderCtx},
};

/// Graph wrapper around the fade [`Envelope`].
///
/// Used as the modulator of an `Amplify`, it decides when a voice is
/// finished: once the release reaches silence the node goes inactive and the
/// voice can be reused.
pub struct EnvNode {
    env: Envelope,
}

impl EnvNode {
    /// Fade in over `attack` seconds, fade out over `release` seconds.
    pub fn fade(attack: f32, release: f32) -> Self {
        Self {
            env: Envelope::fade(attack, release),
        }
    }
}

impl Default for EnvNode {
    fn default() -> Self {
        Self {
            env: Envelope::default(),
        }
    }
}

impl GraphNode for EnvNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.env.render(out, ctx);
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.env.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.env.note_off(ctx);
    }

    fn envelope_level(&self) -> Option<f32> {
        Some(self.env.level())
    }

    fn is_active(&self) -> bool {
        self.env.is_active()
    }
}
