//! Composable building blocks for constructing voice patches.
//!
//! Graph nodes wrap the low-level DSP primitives with the note events and
//! block-based rendering that `PolySynth` voices need. The `extensions`
//! module adds the fluent `.amplify()` helper.

/// Multiply a signal by a modulator (envelope) with an output gain.
pub mod amplify;
/// Envelope node exposing the fade envelope state.
pub mod envelope;
/// Fluent combinators (`.amplify()`).
pub mod extensions;
/// Core traits shared by all graph nodes.
pub mod node;
/// Audio-band oscillators.
pub mod oscillator;

pub use node::{GraphNode, RenderCtx};
