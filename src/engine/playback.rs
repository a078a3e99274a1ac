//! Replaying takes and motifs.
//!
//! Starting a playback turns its material into a list of `(offset, action)`
//! cues and drops them all into the engine's timer queue at once. Stopping
//! never goes back to pull them out again. Every start bumps a generation
//! counter and each cue carries the generation it was planned under; when a
//! cue comes due it only acts if that generation is still the one playing.
//! A stopped, replaced or restarted playback therefore goes quiet for good,
//! whatever is still sitting in the queue.

use std::{collections::HashMap, fmt};

use crate::{
    config::{MotifConfig, PlaybackConfig},
    engine::timer::TimerQueue,
    synth::{ToneSource, VoiceHandle},
    timeline::{NoteEvent, Pitch, TimelineEvent, TimelineId},
};

/// What is being played. Only one playback is active at a time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlaybackId {
    /// A built-in library entry, by name.
    Library(String),
    Archived(TimelineId),
    /// A motif made up on request.
    Generated(u64),
}

impl fmt::Display for PlaybackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackId::Library(name) => write!(f, "library:{name}"),
            PlaybackId::Archived(id) => write!(f, "archive:{id}"),
            PlaybackId::Generated(n) => write!(f, "generated:{n}"),
        }
    }
}

/// The material behind a playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackSource {
    /// Recorded events, replayed at their offsets.
    Timeline(Vec<TimelineEvent>),
    /// Relative pitch offsets, played evenly spaced from the motif root.
    Motif(Vec<i32>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Started,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueAction {
    /// Start a voice. `hold_ms: None` sustains until a matching `Silence`.
    Sound { pitch: Pitch, hold_ms: Option<u64> },
    Silence { pitch: Pitch },
    /// Material is over: release leftovers and clear the active playback.
    Finish,
}

/// A deferred playback step, tagged with the generation that planned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cue {
    pub generation: u64,
    pub action: CueAction,
}

impl PlaybackSource {
    /// Lay the material out as cues relative to the start of playback,
    /// ending with a single `Finish`.
    pub fn cues(&self, playback: &PlaybackConfig, motif: &MotifConfig) -> Vec<(u64, CueAction)> {
        let (mut cues, end) = match self {
            PlaybackSource::Timeline(events) => timeline_cues(events, playback.timeline_hold_ms),
            PlaybackSource::Motif(offsets) => motif_cues(offsets, motif),
        };
        cues.push((end + playback.completion_grace_ms, CueAction::Finish));
        cues
    }
}

fn timeline_cues(events: &[TimelineEvent], hold_ms: u64) -> (Vec<(u64, CueAction)>, u64) {
    // archives are validated on load, but never trust the order here
    let last = events.iter().map(|e| e.offset_ms).max().unwrap_or(0);
    let hold_until = last + hold_ms;
    let mut end = last;

    let cues = events
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let action = match e.event {
                NoteEvent::NoteOn { pitch } => {
                    let terminated = events[i + 1..]
                        .iter()
                        .any(|later| later.event == NoteEvent::NoteOff { pitch });
                    if terminated {
                        CueAction::Sound { pitch, hold_ms: None }
                    } else {
                        // key still down at the end of the take
                        end = hold_until;
                        CueAction::Sound {
                            pitch,
                            hold_ms: Some(hold_until.saturating_sub(e.offset_ms)),
                        }
                    }
                }
                NoteEvent::NoteOff { pitch } => CueAction::Silence { pitch },
            };
            (e.offset_ms, action)
        })
        .collect();
    (cues, end)
}

fn motif_cues(offsets: &[i32], motif: &MotifConfig) -> (Vec<(u64, CueAction)>, u64) {
    let root = Pitch(motif.root);
    let mut end = 0;
    let mut cues = Vec::with_capacity(offsets.len() + 1);
    for (i, &offset) in offsets.iter().enumerate() {
        let Some(pitch) = root.transpose(offset) else {
            tracing::debug!(offset, "motif note out of range, skipped");
            continue;
        };
        let at = i as u64 * motif.spacing_ms;
        end = at + motif.sustain_ms;
        cues.push((
            at,
            CueAction::Sound {
                pitch,
                hold_ms: Some(motif.sustain_ms),
            },
        ));
    }
    (cues, end)
}

#[derive(Debug)]
struct ActivePlayback {
    id: PlaybackId,
    generation: u64,
    /// Self-releasing voices, released early only on stop.
    timed: Vec<VoiceHandle>,
    /// Voices waiting for their NoteOff.
    held: HashMap<Pitch, VoiceHandle>,
}

impl ActivePlayback {
    fn release_all(&mut self, tones: &mut impl ToneSource) {
        for voice in self.timed.drain(..) {
            tones.release(voice);
        }
        for (_, voice) in self.held.drain() {
            tones.release(voice);
        }
    }
}

/// Owns the single active playback and every voice it started.
#[derive(Debug)]
pub struct PlaybackScheduler {
    playback: PlaybackConfig,
    motif: MotifConfig,
    generation: u64,
    active: Option<ActivePlayback>,
}

impl PlaybackScheduler {
    pub fn new(playback: PlaybackConfig, motif: MotifConfig) -> Self {
        Self {
            playback,
            motif,
            generation: 0,
            active: None,
        }
    }

    pub fn active(&self) -> Option<&PlaybackId> {
        self.active.as_ref().map(|a| &a.id)
    }

    pub fn is_playing(&self, id: &PlaybackId) -> bool {
        self.active() == Some(id)
    }

    /// Play/stop button for `id`: stops it if it is the active playback,
    /// otherwise starts it (stopping whatever else was playing).
    pub fn toggle<A: From<Cue>>(
        &mut self,
        id: PlaybackId,
        source: &PlaybackSource,
        now: u64,
        tones: &mut impl ToneSource,
        timers: &mut TimerQueue<A>,
    ) -> PlaybackOutcome {
        if self.is_playing(&id) {
            self.stop(tones);
            PlaybackOutcome::Stopped
        } else {
            self.start(id, source, now, tones, timers);
            PlaybackOutcome::Started
        }
    }

    /// Make `id` the active playback, silencing the previous one first.
    pub fn start<A: From<Cue>>(
        &mut self,
        id: PlaybackId,
        source: &PlaybackSource,
        now: u64,
        tones: &mut impl ToneSource,
        timers: &mut TimerQueue<A>,
    ) {
        self.stop(tones);

        self.generation += 1;
        let generation = self.generation;
        let cues = source.cues(&self.playback, &self.motif);
        tracing::debug!(%id, generation, cues = cues.len(), "playback started");

        for (offset, action) in cues {
            timers.schedule(now + offset, Cue { generation, action }.into());
        }
        self.active = Some(ActivePlayback {
            id,
            generation,
            timed: Vec::new(),
            held: HashMap::new(),
        });
    }

    /// Silence the active playback. Returns what was playing, if anything.
    pub fn stop(&mut self, tones: &mut impl ToneSource) -> Option<PlaybackId> {
        let mut active = self.active.take()?;
        active.release_all(tones);
        tracing::debug!(id = %active.id, "playback stopped");
        Some(active.id)
    }

    /// Carry out a cue that has come due. Returns the playback's id when
    /// this cue finished it.
    pub fn fire(&mut self, cue: Cue, tones: &mut impl ToneSource) -> Option<PlaybackId> {
        let active = match self.active.as_mut() {
            Some(active) if active.generation == cue.generation => active,
            _ => {
                tracing::trace!(?cue, "stale cue skipped");
                return None;
            }
        };

        match cue.action {
            CueAction::Sound { pitch, hold_ms } => {
                if let Some(older) = active.held.remove(&pitch) {
                    tones.release(older);
                }
                match hold_ms {
                    Some(ms) => active.timed.push(tones.acquire_timed(pitch, ms)),
                    None => {
                        active.held.insert(pitch, tones.acquire(pitch));
                    }
                }
                None
            }
            CueAction::Silence { pitch } => {
                if let Some(voice) = active.held.remove(&pitch) {
                    tones.release(voice);
                }
                None
            }
            CueAction::Finish => {
                let mut finished = self.active.take()?;
                finished.release_all(tones);
                tracing::debug!(id = %finished.id, "playback finished");
                Some(finished.id)
            }
        }
    }
}
