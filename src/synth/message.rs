use std::collections::VecDeque;

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer};

use crate::{synth::source::VoiceId, timeline::Pitch};

/// Control messages from the engine thread to the render thread.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SynthMessage {
    /// Begin a voice; with `hold_ms` it releases itself after that long.
    Start {
        voice: VoiceId,
        pitch: Pitch,
        hold_ms: Option<u32>,
    },
    /// Fade out a voice. Unknown or already silent voices are ignored.
    Release { voice: VoiceId },
    ReleaseAll,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

pub trait MessageSender {
    /// Hand the message back when the queue is full.
    fn push(&mut self, msg: SynthMessage) -> Result<(), SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

#[cfg(feature = "rtrb")]
impl MessageSender for Producer<SynthMessage> {
    fn push(&mut self, msg: SynthMessage) -> Result<(), SynthMessage> {
        match Producer::push(self, msg) {
            Ok(()) => Ok(()),
            Err(rtrb::PushError::Full(returned)) => Err(returned),
        }
    }
}

/// Offline rendering (tests, benchmarks) without a ring buffer.
impl MessageReceiver for VecDeque<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        self.pop_front()
    }
}

impl MessageSender for VecDeque<SynthMessage> {
    fn push(&mut self, msg: SynthMessage) -> Result<(), SynthMessage> {
        self.push_back(msg);
        Ok(())
    }
}
