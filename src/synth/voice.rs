use crate::{
    graph::node::{GraphNode, RenderCtx},
    synth::source::VoiceId,
    timeline::Pitch,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Sounding, envelope in attack/sustain
    Releasing, // Fading out
}

/// One rendered voice, addressed by the [`VoiceId`] the engine handed out.
pub struct Voice<T: GraphNode> {
    id: Option<VoiceId>,
    pitch: Pitch,
    state: VoiceState,
    age: u64,
    sample_rate: f32,
    /// Frames left before a timed voice releases itself.
    hold_frames: Option<u64>,
    graph: T,
}

impl<T: GraphNode> Voice<T> {
    pub fn new(graph: T, sample_rate: f32) -> Self {
        Self {
            id: None,
            pitch: Pitch::C4,
            state: VoiceState::Free,
            age: 0,
            sample_rate,
            hold_frames: None,
            graph,
        }
    }

    pub fn start(&mut self, id: VoiceId, pitch: Pitch, hold_ms: Option<u32>, age: u64) {
        self.id = Some(id);
        self.pitch = pitch;
        self.state = VoiceState::Active;
        self.age = age;
        self.hold_frames =
            hold_ms.map(|ms| (ms as f64 * self.sample_rate as f64 / 1000.0).round() as u64);

        self.graph.note_on(&self.ctx());
    }

    pub fn release(&mut self) {
        if self.state == VoiceState::Active {
            self.state = VoiceState::Releasing;
            self.hold_frames = None;
            self.graph.note_off(&self.ctx());
        }
    }

    pub fn render(&mut self, out: &mut [f32]) {
        let ctx = self.ctx();

        // A timed voice whose hold ends inside this block releases mid-block.
        match self.hold_frames {
            Some(remaining) if (remaining as usize) < out.len() => {
                let (held, faded) = out.split_at_mut(remaining as usize);
                self.graph.render_block(held, &ctx);
                self.release();
                self.graph.render_block(faded, &ctx);
            }
            Some(remaining) => {
                self.hold_frames = Some(remaining - out.len() as u64);
                self.graph.render_block(out, &ctx);
            }
            None => self.graph.render_block(out, &ctx),
        }

        if self.state == VoiceState::Releasing && !self.graph.is_active() {
            self.free();
        }
    }

    fn ctx(&self) -> RenderCtx {
        RenderCtx::from_pitch(self.sample_rate, self.pitch, 1.0)
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, VoiceState::Active | VoiceState::Releasing)
    }

    pub fn envelope_level(&self) -> Option<f32> {
        self.graph.envelope_level()
    }

    pub fn free(&mut self) {
        self.state = VoiceState::Free;
        self.id = None;
        self.hold_frames = None;
    }

    pub fn id(&self) -> Option<VoiceId> {
        self.id
    }

    pub fn pitch(&self) -> Pitch {
        self.pitch
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }
}
