//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice structs.

/// Attack/sustain/release fade envelope.
pub mod envelope;
/// Periodic oscillator waveforms.
pub mod oscillator;

pub use envelope::EnvelopeState;
pub use oscillator::OscillatorWaveform;
