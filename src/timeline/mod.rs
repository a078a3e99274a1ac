//! Performance data model: pitches, timestamped note events and the
//! finalized timeline that the archive owns.
//!
//! Offsets are milliseconds of *active* recording time, so pauses never show
//! up as gaps. Events are appended live and therefore already sorted.

mod pitch;

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use pitch::Pitch;

/// A key going down or coming up.
///
/// Serialized in the archive's `{"type": "on", "midi": 60}` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NoteEvent {
    #[serde(rename = "on")]
    NoteOn {
        #[serde(rename = "midi")]
        pitch: Pitch,
    },
    #[serde(rename = "off")]
    NoteOff {
        #[serde(rename = "midi")]
        pitch: Pitch,
    },
}

impl NoteEvent {
    pub fn pitch(&self) -> Pitch {
        match *self {
            NoteEvent::NoteOn { pitch } | NoteEvent::NoteOff { pitch } => pitch,
        }
    }

    pub fn is_note_on(&self) -> bool {
        matches!(self, NoteEvent::NoteOn { .. })
    }
}

/// A note event stamped with its offset from the start of the take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    #[serde(rename = "time")]
    pub offset_ms: u64,
    #[serde(flatten)]
    pub event: NoteEvent,
}

impl TimelineEvent {
    pub fn note_on(offset_ms: u64, pitch: Pitch) -> Self {
        Self {
            offset_ms,
            event: NoteEvent::NoteOn { pitch },
        }
    }

    pub fn note_off(offset_ms: u64, pitch: Pitch) -> Self {
        Self {
            offset_ms,
            event: NoteEvent::NoteOff { pitch },
        }
    }

    pub fn pitch(&self) -> Pitch {
        self.event.pitch()
    }
}

/// Unique identity of an archived performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimelineId(Uuid);

impl TimelineId {
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TimelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TimelineId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A finalized, replayable performance.
///
/// Only `name` and `annotation` change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub id: TimelineId,
    pub name: String,
    pub events: Vec<TimelineEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

impl Timeline {
    /// Freeze captured events under a fresh id.
    pub fn new(name: impl Into<String>, events: Vec<TimelineEvent>) -> Self {
        Self {
            id: TimelineId::new_random(),
            name: name.into(),
            events,
            annotation: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Offset of the last event (0 for an empty timeline).
    pub fn duration_ms(&self) -> u64 {
        self.events.last().map_or(0, |e| e.offset_ms)
    }

    /// Pitches that were struck, in order of first appearance.
    pub fn distinct_pitches(&self) -> Vec<Pitch> {
        let mut seen = BTreeSet::new();
        self.events
            .iter()
            .filter(|e| e.event.is_note_on())
            .map(TimelineEvent::pitch)
            .filter(|p| seen.insert(*p))
            .collect()
    }

    /// Pitches whose last event is a NoteOn (key still held at stop).
    pub fn unterminated_pitches(&self) -> Vec<Pitch> {
        let mut open = BTreeSet::new();
        for e in &self.events {
            match e.event {
                NoteEvent::NoteOn { pitch } => {
                    open.insert(pitch);
                }
                NoteEvent::NoteOff { pitch } => {
                    open.remove(&pitch);
                }
            }
        }
        open.into_iter().collect()
    }

    /// Check the recording invariants: offsets never go backwards and each
    /// pitch alternates NoteOn/NoteOff starting with NoteOn.
    pub fn validate(&self) -> Result<(), TimelineError> {
        let mut open = BTreeSet::new();
        let mut last = 0;
        for (index, e) in self.events.iter().enumerate() {
            if e.offset_ms < last {
                return Err(TimelineError::OutOfOrder { index });
            }
            last = e.offset_ms;
            let pitch = e.pitch();
            let fresh = match e.event {
                NoteEvent::NoteOn { .. } => open.insert(pitch),
                NoteEvent::NoteOff { .. } => open.remove(&pitch),
            };
            if !fresh {
                return Err(TimelineError::BrokenAlternation { index, pitch });
            }
        }
        Ok(())
    }
}

/// Structural problems found by [`Timeline::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimelineError {
    #[error("event {index} is earlier than the event before it")]
    OutOfOrder { index: usize },
    #[error("event {index} breaks on/off alternation for {pitch}")]
    BrokenAlternation { index: usize, pitch: Pitch },
}
