// Purpose: tone source seam, voice management and polyphony
// The engine talks to `ToneSource`; `PolySynth` renders the voices it asks for

pub mod factory;
pub mod log;
pub mod message;
pub mod poly;
pub mod source;
pub mod voice;

pub use log::{ToneCall, ToneLog};
pub use message::SynthMessage;
pub use poly::PolySynth;
pub use source::{SynthToneSource, ToneSource, VoiceHandle, VoiceId};
