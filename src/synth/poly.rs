use crate::{
    graph::node::GraphNode,
    synth::{
        factory::VoiceFactory,
        message::{MessageReceiver, SynthMessage},
        voice::{Voice, VoiceState},
    },
    timeline::Pitch,
    MAX_BLOCK_SIZE,
};

/// Render side of the tone source.
///
/// Runs on the audio thread: drains control messages, keeps a fixed pool of
/// voices and mixes them into each output block. Nothing here allocates after
/// construction.
pub struct PolySynth<R: MessageReceiver> {
    voices: Vec<Voice<Box<dyn GraphNode>>>,
    rx: R,
    temp_buffer: Vec<f32>,
    frame_counter: u64,
}

impl<R: MessageReceiver> PolySynth<R> {
    pub fn new(sample_rate: f32, max_voices: usize, rx: R, factory: &impl VoiceFactory) -> Self {
        let voices = (0..max_voices.max(1))
            .map(|_| Voice::new(factory.create_voice(), sample_rate))
            .collect();

        Self {
            voices,
            rx,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
            frame_counter: 0,
        }
    }

    pub fn render_block(&mut self, out: &mut [f32]) {
        while let Some(msg) = self.rx.pop() {
            match msg {
                SynthMessage::Start {
                    voice,
                    pitch,
                    hold_ms,
                } => {
                    let age = self.frame_counter;
                    if let Some(slot) = self.allocate_voice() {
                        slot.start(voice, pitch, hold_ms, age);
                    }
                }
                SynthMessage::Release { voice } => {
                    if let Some(slot) = self.voices.iter_mut().find(|v| v.id() == Some(voice)) {
                        slot.release();
                    }
                }
                SynthMessage::ReleaseAll => {
                    for voice in &mut self.voices {
                        voice.release();
                    }
                }
            }
        }

        out.fill(0.0);
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            for voice in &mut self.voices {
                if voice.is_active() {
                    let temp = &mut self.temp_buffer[..chunk.len()];
                    temp.fill(0.0);
                    voice.render(temp);

                    for (o, v) in chunk.iter_mut().zip(temp.iter()) {
                        *o += v;
                    }
                }
            }
        }

        self.frame_counter += out.len() as u64;
    }

    /// Number of voices currently producing sound (including fade-outs).
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Pitches of voices that are still held (not fading).
    pub fn held_pitches(&self) -> impl Iterator<Item = Pitch> + '_ {
        self.voices
            .iter()
            .filter(|v| v.state() == VoiceState::Active)
            .map(|v| v.pitch())
    }

    fn allocate_voice(&mut self) -> Option<&mut Voice<Box<dyn GraphNode>>> {
        // First pass: free voice
        if let Some(idx) = self.voices.iter().position(|v| v.is_free()) {
            return Some(&mut self.voices[idx]);
        }

        // Second pass: steal the oldest fading voice
        let steal_idx = self
            .voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.state() == VoiceState::Releasing)
            .min_by_key(|(_, v)| v.age())
            .map(|(idx, _)| idx);

        steal_idx.map(|idx| &mut self.voices[idx])
    }
}
