use crate::{graph::node::RenderCtx, MIN_TIME};

/*
Fade Envelope
=============

A notepad voice has no decay stage: it fades in to full level, holds there
for as long as the key is down (or until its timed release), then fades out.
So this is an attack/sustain/release envelope with the sustain fixed at 1.0.

  Level
    1.0 ┐   ╱‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾╲
        │  ╱                  ╲
    0.0 └─╱────────────────────╲──→ Time
        Attack   Sustain     Release

The short attack removes the click of a waveform starting mid-cycle, the
release removes the click of it stopping.


State Machine
-------------

    Idle ──note_on──→ Attack ──level=1──→ Sustain
      ↑                  │                   │
      │               note_off            note_off
      │                  ↓                   ↓
      └────level=0──── Release ←─────────────┘

note_off from Attack starts the release from the current (partial) level,
so a key tapped faster than the attack never jumps to full volume.
note_off while Idle or already in Release does nothing: releasing a voice
twice is harmless.


Release Precision
-----------------

Release snapshots the starting level and the total number of samples at
note_off time and interpolates, so it always lands on exactly 0.0 after
`release_time` seconds regardless of where it started.
*/

/// The current stage of the fade envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // Silent, level = 0
    Attack,  // Ramping up to 1.0
    Sustain, // Holding at 1.0 while the voice is held
    Release, // Ramping down to 0
}

pub struct Envelope {
    attack_time: f32,  // seconds to ramp 0 → 1
    release_time: f32, // seconds to ramp current → 0

    stage: EnvelopeState,
    level: f32,

    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::fade(0.05, 0.2)
    }
}

impl Envelope {
    /// Fade in over `attack` seconds, fade out over `release` seconds.
    pub fn fade(attack: f32, release: f32) -> Self {
        Self {
            attack_time: attack.max(MIN_TIME),
            release_time: release.max(MIN_TIME),
            stage: EnvelopeState::Idle,
            level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        }
    }

    /// Start (or restart) the fade-in from silence.
    pub fn note_on(&mut self, _ctx: &RenderCtx) {
        self.level = 0.0;
        self.stage = EnvelopeState::Attack;
        self.release_elapsed_samples = 0;
    }

    /// Start the fade-out from the current level.
    pub fn note_off(&mut self, ctx: &RenderCtx) {
        if matches!(self.stage, EnvelopeState::Idle | EnvelopeState::Release) {
            return;
        }

        self.release_start_level = self.level;
        self.release_total_samples = (self.release_time * ctx.sample_rate).round().max(1.0) as u32;
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeState::Release;
    }

    /// Advance the envelope by one sample.
    pub fn next_sample(&mut self, ctx: &RenderCtx) {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                self.level += 1.0 / (self.attack_time * ctx.sample_rate);
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeState::Sustain;
                }
            }

            EnvelopeState::Sustain => {
                self.level = 1.0;
            }

            EnvelopeState::Release => {
                let progress =
                    self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);

                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);
                if self.release_elapsed_samples >= self.release_total_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        for sample in buffer.iter_mut() {
            self.next_sample(ctx);
            *sample = self.level;
        }
    }

    /// Returns true while the envelope produces output.
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeState::Idle)
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}
