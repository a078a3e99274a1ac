use std::{collections::BTreeSet, fmt};

use thiserror::Error;

use crate::timeline::{NoteEvent, Pitch, TimelineEvent};

/// Where the recorder is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordingStatus {
    Idle,
    Active,
    Paused,
}

impl fmt::Display for RecordingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordingStatus::Idle => "idle",
            RecordingStatus::Active => "recording",
            RecordingStatus::Paused => "paused",
        })
    }
}

/// Distinguishes one take from the next, so a deadline armed for an old
/// take can never stop a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot {action} while {status}")]
    InvalidTransition {
        action: &'static str,
        status: RecordingStatus,
    },
}

/// One take in progress.
///
/// Offsets are measured in active time: wall time since the start minus
/// every completed pause, frozen at the pause point while paused.
#[derive(Debug, Clone)]
pub struct RecordingSession {
    id: SessionId,
    status: RecordingStatus,
    started_at: u64,
    accumulated_pause_ms: u64,
    pause_started_at: Option<u64>,
    events: Vec<TimelineEvent>,
    open: BTreeSet<Pitch>,
}

impl RecordingSession {
    pub fn start(id: SessionId, now: u64) -> Self {
        Self {
            id,
            status: RecordingStatus::Active,
            started_at: now,
            accumulated_pause_ms: 0,
            pause_started_at: None,
            events: Vec::new(),
            open: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// `Active` or `Paused`; a finished take no longer exists.
    pub fn status(&self) -> RecordingStatus {
        self.status
    }

    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    /// Pitches with a NoteOn and no NoteOff yet.
    pub fn open_pitches(&self) -> impl Iterator<Item = Pitch> + '_ {
        self.open.iter().copied()
    }

    pub fn accumulated_pause_ms(&self) -> u64 {
        self.accumulated_pause_ms
    }

    /// Active time elapsed at `now`.
    pub fn offset_at(&self, now: u64) -> u64 {
        let until = self.pause_started_at.unwrap_or(now);
        until
            .saturating_sub(self.started_at)
            .saturating_sub(self.accumulated_pause_ms)
    }

    /// Active time left before `budget_ms` is used up.
    pub fn remaining_ms(&self, budget_ms: u64, now: u64) -> u64 {
        budget_ms.saturating_sub(self.offset_at(now))
    }

    pub fn pause(&mut self, now: u64) -> Result<(), SessionError> {
        self.expect(RecordingStatus::Active, "pause")?;
        self.pause_started_at = Some(now);
        self.status = RecordingStatus::Paused;
        tracing::debug!(session = self.id.0, offset = self.offset_at(now), "recording paused");
        Ok(())
    }

    /// Returns how long the pause lasted.
    pub fn resume(&mut self, now: u64) -> Result<u64, SessionError> {
        self.expect(RecordingStatus::Paused, "resume")?;
        let paused = self
            .pause_started_at
            .take()
            .map_or(0, |at| now.saturating_sub(at));
        self.accumulated_pause_ms += paused;
        self.status = RecordingStatus::Active;
        tracing::debug!(session = self.id.0, paused, "recording resumed");
        Ok(paused)
    }

    /// Append `event` at the current offset.
    ///
    /// Refused (returns false) while paused, for a NoteOn on a pitch that is
    /// already open, and for a NoteOff on a pitch that is not, so every
    /// pitch alternates on/off starting with on.
    pub fn record(&mut self, event: NoteEvent, now: u64) -> bool {
        if self.status != RecordingStatus::Active {
            tracing::trace!(?event, "not recording while paused");
            return false;
        }
        let accepted = match event {
            NoteEvent::NoteOn { pitch } => self.open.insert(pitch),
            NoteEvent::NoteOff { pitch } => self.open.remove(&pitch),
        };
        if !accepted {
            tracing::debug!(?event, "event would break on/off alternation, dropped");
            return false;
        }
        self.events.push(TimelineEvent {
            offset_ms: self.offset_at(now),
            event,
        });
        true
    }

    /// Close every open pitch for which `still_held` is false, e.g. keys let
    /// go during a pause. Returns the pitches closed.
    pub fn close_released(&mut self, now: u64, still_held: impl Fn(Pitch) -> bool) -> Vec<Pitch> {
        let released: Vec<_> = self.open.iter().copied().filter(|p| !still_held(*p)).collect();
        for &pitch in &released {
            self.record(NoteEvent::NoteOff { pitch }, now);
        }
        released
    }

    /// End the take and hand over its events.
    pub fn finish(self) -> Vec<TimelineEvent> {
        self.events
    }

    fn expect(&self, status: RecordingStatus, action: &'static str) -> Result<(), SessionError> {
        if self.status == status {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                action,
                status: self.status,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on(pitch: u8) -> NoteEvent {
        NoteEvent::NoteOn { pitch: Pitch(pitch) }
    }

    fn off(pitch: u8) -> NoteEvent {
        NoteEvent::NoteOff { pitch: Pitch(pitch) }
    }

    #[test]
    fn pause_time_is_not_recorded() {
        let mut take = RecordingSession::start(SessionId(1), 1_000);
        assert!(take.record(on(60), 1_000));
        assert!(take.record(off(60), 1_300));
        take.pause(1_300).unwrap();
        assert_eq!(take.resume(2_300).unwrap(), 1_000);
        assert!(take.record(on(64), 2_300));

        let offsets: Vec<_> = take.finish().iter().map(|e| e.offset_ms).collect();
        assert_eq!(offsets, vec![0, 300, 300]);
    }

    #[test]
    fn offset_freezes_while_paused() {
        let mut take = RecordingSession::start(SessionId(1), 0);
        take.pause(400).unwrap();
        assert_eq!(take.offset_at(400), 400);
        assert_eq!(take.offset_at(5_000), 400);
        assert_eq!(take.remaining_ms(1_000, 5_000), 600);

        take.resume(5_000).unwrap();
        assert_eq!(take.offset_at(5_100), 500);
        assert_eq!(take.accumulated_pause_ms(), 4_600);
    }

    #[test]
    fn nothing_is_captured_while_paused() {
        let mut take = RecordingSession::start(SessionId(1), 0);
        take.pause(10).unwrap();
        assert!(!take.record(on(60), 20));
        assert!(take.events().is_empty());
    }

    #[test]
    fn alternation_is_enforced() {
        let mut take = RecordingSession::start(SessionId(1), 0);
        assert!(!take.record(off(60), 0));
        assert!(take.record(on(60), 0));
        assert!(!take.record(on(60), 5));
        assert!(take.record(off(60), 10));
        assert!(!take.record(off(60), 15));
        assert_eq!(take.events().len(), 2);
    }

    #[test]
    fn invalid_transitions_leave_state_alone() {
        let mut take = RecordingSession::start(SessionId(1), 0);
        take.record(on(60), 0);

        assert_eq!(
            take.resume(10),
            Err(SessionError::InvalidTransition {
                action: "resume",
                status: RecordingStatus::Active
            })
        );
        take.pause(10).unwrap();
        assert!(take.pause(20).is_err());
        assert_eq!(take.status(), RecordingStatus::Paused);
        assert_eq!(take.events().len(), 1);
    }

    #[test]
    fn keys_released_during_a_pause_are_closed_on_resume() {
        let mut take = RecordingSession::start(SessionId(1), 0);
        take.record(on(60), 0);
        take.record(on(62), 50);
        take.pause(100).unwrap();
        take.resume(900).unwrap();

        // 62 is still down, 60 came up while paused
        let closed = take.close_released(900, |p| p == Pitch(62));
        assert_eq!(closed, vec![Pitch(60)]);
        assert_eq!(take.events().last(), Some(&TimelineEvent::note_off(100, Pitch(60))));
        assert_eq!(take.open_pitches().collect::<Vec<_>>(), vec![Pitch(62)]);
    }
}
