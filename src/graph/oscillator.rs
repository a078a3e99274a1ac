use crate::dsp::oscillator::{OscillatorBlock, OscillatorWaveform};
use crate::graph::node::{GraphNode, RenderCtx};

/*
Audio Oscillator
================

The raw sound source of a notepad voice. It follows the voice pitch
(`ctx.frequency`) and restarts its cycle on every note-on so that repeated
presses of the same key sound identical.

Sine:     pure, hollow. Fundamental only.
Triangle: soft, flute-like. Weak odd harmonics (1/n²). The notepad default.
Saw:      bright, buzzy. All harmonics (1/n).
Square:   hollow, woody. Odd harmonics (1/n).

Example usage:
  let voice = OscNode::triangle().amplify(EnvNode::fade(0.05, 0.2)).with_gain(0.25);
*/

pub struct OscNode {
    osc: OscillatorBlock,
}

impl OscNode {
    pub fn new(waveform: OscillatorWaveform) -> Self {
        Self {
            osc: OscillatorBlock::new(waveform),
        }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorWaveform::Sine)
    }

    pub fn triangle() -> Self {
        Self::new(OscillatorWaveform::Triangle)
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.osc.waveform()
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.osc.render(out, ctx);
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.osc.reset();
    }
}
