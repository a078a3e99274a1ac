use std::fmt;

use crate::{
    synth::message::{MessageSender, SynthMessage},
    timeline::Pitch,
};

/// Identity of one sounding voice, unique per tone source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(pub u64);

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Token for a voice handed out by a [`ToneSource`].
///
/// Whoever acquired it owns it; releasing it more than once, or after a
/// timed voice already ran out, is harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceHandle {
    id: VoiceId,
    pitch: Pitch,
}

impl VoiceHandle {
    pub fn new(id: VoiceId, pitch: Pitch) -> Self {
        Self { id, pitch }
    }

    pub fn id(&self) -> VoiceId {
        self.id
    }

    pub fn pitch(&self) -> Pitch {
        self.pitch
    }
}

/// Something that can make a pitch audible.
pub trait ToneSource {
    /// Start a voice that sustains until released.
    fn acquire(&mut self, pitch: Pitch) -> VoiceHandle;

    /// Start a voice that fades out on its own after `duration_ms`.
    fn acquire_timed(&mut self, pitch: Pitch, duration_ms: u64) -> VoiceHandle;

    /// Fade out and silence a voice. Must be idempotent.
    fn release(&mut self, voice: VoiceHandle);
}

/// Engine-side half of the synth: turns tone requests into
/// [`SynthMessage`]s for a [`PolySynth`](crate::synth::PolySynth) on the
/// audio thread.
pub struct SynthToneSource<S: MessageSender> {
    tx: S,
    next_id: u64,
}

impl<S: MessageSender> SynthToneSource<S> {
    pub fn new(tx: S) -> Self {
        Self { tx, next_id: 0 }
    }

    /// Fade out every voice the synth is rendering.
    pub fn release_everything(&mut self) {
        self.send(SynthMessage::ReleaseAll);
    }

    fn start(&mut self, pitch: Pitch, hold_ms: Option<u32>) -> VoiceHandle {
        self.next_id += 1;
        let voice = VoiceId(self.next_id);
        self.send(SynthMessage::Start {
            voice,
            pitch,
            hold_ms,
        });
        VoiceHandle::new(voice, pitch)
    }

    fn send(&mut self, msg: SynthMessage) {
        if let Err(dropped) = self.tx.push(msg) {
            tracing::warn!(?dropped, "synth message queue full, dropping message");
        }
    }
}

impl<S: MessageSender> ToneSource for SynthToneSource<S> {
    fn acquire(&mut self, pitch: Pitch) -> VoiceHandle {
        self.start(pitch, None)
    }

    fn acquire_timed(&mut self, pitch: Pitch, duration_ms: u64) -> VoiceHandle {
        let hold = u32::try_from(duration_ms).unwrap_or(u32::MAX);
        self.start(pitch, Some(hold))
    }

    fn release(&mut self, voice: VoiceHandle) {
        self.send(SynthMessage::Release { voice: voice.id() });
    }
}
