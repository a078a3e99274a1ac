//! The notepad voice.
//!
//! A single patch: oscillator × fade envelope × gain. The defaults (triangle
//! wave, 50ms fade-in, 200ms fade-out, gain 0.25) give a soft, click-free key
//! that stays clean when several notes overlap.
//!
//! # Example
//!
//! ```
//! use tonepad::{
//!     config::ToneConfig,
//!     graph::{GraphNode, RenderCtx},
//!     timeline::Pitch,
//!     voices,
//! };
//!
//! let mut voice = voices::notepad(&ToneConfig::default());
//! let ctx = RenderCtx::from_pitch(48_000.0, Pitch::C4, 1.0);
//! voice.note_on(&ctx);
//!
//! let mut block = [0.0f32; 256];
//! voice.render_block(&mut block, &ctx);
//! assert!(block.iter().all(|s| s.abs() <= 0.25));
//! ```

use crate::{
    config::ToneConfig,
    graph::{envelope::EnvNode, extensions::NodeExt, oscillator::OscNode, GraphNode},
};

/// Build the notepad voice described by `tone`.
pub fn notepad(tone: &ToneConfig) -> impl GraphNode {
    OscNode::new(tone.waveform)
        .amplify(EnvNode::fade(
            tone.attack_ms as f32 / 1000.0,
            tone.release_ms as f32 / 1000.0,
        ))
        .with_gain(tone.gain)
}
