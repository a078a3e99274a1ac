pub mod archive; // Durable store of finished takes
pub mod assist; // Optional text-service helpers (naming, motif generation)
pub mod config;
pub mod dsp;
pub mod engine; // Recording, playback and the deferred-action queue
pub mod graph; // Composable audio graph nodes
pub mod library;
pub mod synth; // Tone sources, voice management and polyphony
pub mod timeline;
pub mod voices;

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
