//! The capture-and-playback engine.
//!
//! [`Engine`] owns every piece of mutable state: the keys being held, the
//! take being recorded, the playback being heard and the queue of deferred
//! actions. Nothing runs in the background. User actions are method calls;
//! anything that has to happen later is queued and carried out by the next
//! [`Engine::tick`] at or after its due time. The front end calls `tick`
//! regularly (every frame is plenty) and shows the [`Notice`]s it returns.

pub mod clock;
pub mod playback;
pub mod registry;
pub mod session;
pub mod timer;

use thiserror::Error;

use crate::{
    archive::{ArchiveError, ArchiveStore},
    assist::{Analysis, Analyst, AssistError, Composer},
    config::EngineConfig,
    library::ToneLibrary,
    synth::ToneSource,
    timeline::{NoteEvent, Pitch, Timeline, TimelineId},
};

use self::{
    clock::Clock,
    playback::{Cue, PlaybackId, PlaybackOutcome, PlaybackScheduler, PlaybackSource},
    registry::VoiceRegistry,
    session::{RecordingSession, RecordingStatus, SessionError, SessionId},
    timer::TimerQueue,
};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Assist(#[from] AssistError),
    /// The take was finalized but the archive refused it. It is handed back
    /// so the caller can retry.
    #[error("recording \"{}\" could not be archived", timeline.name)]
    Unsaved {
        timeline: Box<Timeline>,
        #[source]
        source: ArchiveError,
    },
    #[error("no library entry at index {0}")]
    NoSuchEntry(usize),
}

/// Something the front end should hear about after a [`Engine::tick`].
#[derive(Debug)]
pub enum Notice {
    /// The recording hit its time limit and was archived.
    RecordingSaved(Timeline),
    /// The recording hit its time limit with nothing in it.
    RecordingDiscarded,
    /// The recording hit its time limit and could not be archived.
    RecordingFailed(EngineError),
    /// A playback ran to the end on its own.
    PlaybackFinished(PlaybackId),
}

/// Work queued for a later tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    Playback(Cue),
    /// Check whether a take has used up its recording budget.
    RecordingDeadline(SessionId),
}

impl From<Cue> for Deferred {
    fn from(cue: Cue) -> Self {
        Deferred::Playback(cue)
    }
}

pub struct Engine<T: ToneSource> {
    config: EngineConfig,
    clock: Box<dyn Clock>,
    tones: T,
    keys: VoiceRegistry,
    session: Option<RecordingSession>,
    next_session: u64,
    playback: PlaybackScheduler,
    next_generated: u64,
    timers: TimerQueue<Deferred>,
    archive: Box<dyn ArchiveStore>,
    library: ToneLibrary,
}

impl<T: ToneSource> Engine<T> {
    pub fn new(
        config: EngineConfig,
        clock: impl Clock + 'static,
        tones: T,
        archive: impl ArchiveStore + 'static,
    ) -> Self {
        let playback = PlaybackScheduler::new(config.playback.clone(), config.motif.clone());
        Self {
            config,
            clock: Box::new(clock),
            tones,
            keys: VoiceRegistry::new(),
            session: None,
            next_session: 0,
            playback,
            next_generated: 0,
            timers: TimerQueue::new(),
            archive: Box::new(archive),
            library: ToneLibrary::builtin(),
        }
    }

    pub fn tones(&self) -> &T {
        &self.tones
    }

    pub fn tones_mut(&mut self) -> &mut T {
        &mut self.tones
    }

    pub fn library(&self) -> &ToneLibrary {
        &self.library
    }

    fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    // --- live keys ---

    /// A key went down. Returns false if it was already sounding.
    pub fn press(&mut self, pitch: Pitch) -> bool {
        if !self.keys.press(pitch, &mut self.tones) {
            return false;
        }
        self.capture(NoteEvent::NoteOn { pitch });
        true
    }

    /// A key came up. Returns false if it was not sounding.
    pub fn release(&mut self, pitch: Pitch) -> bool {
        if !self.keys.release(pitch, &mut self.tones) {
            return false;
        }
        self.capture(NoteEvent::NoteOff { pitch });
        true
    }

    /// Let go of every held key, e.g. when the window loses focus.
    pub fn release_all_keys(&mut self) {
        for pitch in self.keys.release_all(&mut self.tones) {
            self.capture(NoteEvent::NoteOff { pitch });
        }
    }

    pub fn held_pitches(&self) -> Vec<Pitch> {
        self.keys.held()
    }

    fn capture(&mut self, event: NoteEvent) {
        let now = self.now();
        if let Some(session) = self.session.as_mut() {
            session.record(event, now);
        }
    }

    // --- recording ---

    pub fn recording_status(&self) -> RecordingStatus {
        self.session
            .as_ref()
            .map_or(RecordingStatus::Idle, RecordingSession::status)
    }

    /// Active (unpaused) time of the current take.
    pub fn recording_elapsed(&self) -> Option<u64> {
        let now = self.now();
        self.session.as_ref().map(|s| s.offset_at(now))
    }

    /// Begin a new take. Keys already held when it starts are not part of it.
    pub fn start_recording(&mut self) -> Result<SessionId, EngineError> {
        if let Some(session) = &self.session {
            return Err(SessionError::InvalidTransition {
                action: "start",
                status: session.status(),
            }
            .into());
        }

        self.next_session += 1;
        let id = SessionId(self.next_session);
        let now = self.now();
        self.session = Some(RecordingSession::start(id, now));
        if let Some(budget) = self.config.recording.max_duration_ms {
            self.timers.schedule(now + budget, Deferred::RecordingDeadline(id));
        }
        tracing::debug!(session = id.0, "recording started");
        Ok(id)
    }

    pub fn pause_recording(&mut self) -> Result<(), EngineError> {
        let now = self.now();
        self.active_session("pause")?.pause(now)?;
        Ok(())
    }

    /// Resume capturing. Keys let go while paused get their NoteOff now.
    pub fn resume_recording(&mut self) -> Result<(), EngineError> {
        let now = self.now();
        let keys = &self.keys;
        let session = self
            .session
            .as_mut()
            .ok_or(SessionError::InvalidTransition {
                action: "resume",
                status: RecordingStatus::Idle,
            })?;
        session.resume(now)?;

        let closed = session.close_released(now, |pitch| keys.is_held(pitch));
        if !closed.is_empty() {
            tracing::debug!(?closed, "closed notes released during pause");
        }

        if let Some(budget) = self.config.recording.max_duration_ms {
            let due = now + session.remaining_ms(budget, now);
            let id = session.id();
            self.timers.schedule(due, Deferred::RecordingDeadline(id));
        }
        Ok(())
    }

    /// Pause if recording, resume if paused.
    pub fn toggle_pause(&mut self) -> Result<RecordingStatus, EngineError> {
        match self.recording_status() {
            RecordingStatus::Active => self.pause_recording()?,
            RecordingStatus::Paused => self.resume_recording()?,
            RecordingStatus::Idle => {
                return Err(SessionError::InvalidTransition {
                    action: "pause",
                    status: RecordingStatus::Idle,
                }
                .into())
            }
        }
        Ok(self.recording_status())
    }

    /// Finish the take. Returns the archived timeline, or `None` when there
    /// was no take or it captured nothing. Safe to call at any time.
    pub fn stop_recording(&mut self) -> Result<Option<Timeline>, EngineError> {
        let Some(session) = self.session.take() else {
            return Ok(None);
        };
        let id = session.id();
        let events = session.finish();
        if events.is_empty() {
            tracing::debug!(session = id.0, "empty recording discarded");
            return Ok(None);
        }

        let number = match self.archive.list() {
            Ok(all) => all.len() + 1,
            Err(err) => {
                tracing::warn!(error = %err, "could not count archived takes, naming from 1");
                1
            }
        };
        let timeline = Timeline::new(format!("User Mix {number}"), events);
        if let Err(source) = self.archive.save(timeline.clone()) {
            tracing::warn!(error = %source, "could not archive recording");
            return Err(EngineError::Unsaved {
                timeline: Box::new(timeline),
                source,
            });
        }
        tracing::info!(
            id = %timeline.id,
            name = %timeline.name,
            events = timeline.events.len(),
            "recording saved"
        );
        Ok(Some(timeline))
    }

    fn active_session(&mut self, action: &'static str) -> Result<&mut RecordingSession, SessionError> {
        self.session.as_mut().ok_or(SessionError::InvalidTransition {
            action,
            status: RecordingStatus::Idle,
        })
    }

    fn recording_deadline(&mut self, id: SessionId, now: u64) -> Option<Notice> {
        let budget = self.config.recording.max_duration_ms?;
        let session = self.session.as_ref().filter(|s| s.id() == id)?;
        if session.status() != RecordingStatus::Active {
            // resume arms a fresh deadline
            return None;
        }

        let remaining = session.remaining_ms(budget, now);
        if remaining > 0 {
            self.timers
                .schedule(now + remaining, Deferred::RecordingDeadline(id));
            return None;
        }

        tracing::debug!(session = id.0, budget, "recording budget used up");
        Some(match self.stop_recording() {
            Ok(Some(timeline)) => Notice::RecordingSaved(timeline),
            Ok(None) => Notice::RecordingDiscarded,
            Err(err) => Notice::RecordingFailed(err),
        })
    }

    // --- playback ---

    pub fn active_playback(&self) -> Option<&PlaybackId> {
        self.playback.active()
    }

    /// Start `id`, or stop it if it is what is playing now.
    pub fn toggle_playback(&mut self, id: PlaybackId, source: &PlaybackSource) -> PlaybackOutcome {
        let now = self.now();
        self.playback
            .toggle(id, source, now, &mut self.tones, &mut self.timers)
    }

    pub fn stop_playback(&mut self) -> Option<PlaybackId> {
        self.playback.stop(&mut self.tones)
    }

    /// Toggle playback of an archived take.
    pub fn play_timeline(&mut self, id: TimelineId) -> Result<PlaybackOutcome, EngineError> {
        let playback_id = PlaybackId::Archived(id);
        if self.playback.is_playing(&playback_id) {
            self.stop_playback();
            return Ok(PlaybackOutcome::Stopped);
        }
        let timeline = self.archive.get(id)?;
        Ok(self.toggle_playback(playback_id, &PlaybackSource::Timeline(timeline.events)))
    }

    /// Toggle playback of a library entry.
    pub fn play_library(&mut self, index: usize) -> Result<PlaybackOutcome, EngineError> {
        let entry = self
            .library
            .get(index)
            .ok_or(EngineError::NoSuchEntry(index))?;
        let id = PlaybackId::Library(entry.name.clone());
        let source = PlaybackSource::Motif(entry.motif.clone());
        Ok(self.toggle_playback(id, &source))
    }

    /// Ask `composer` for a motif matching `description` and play it.
    pub fn play_generated(
        &mut self,
        description: &str,
        composer: &impl Composer,
    ) -> Result<PlaybackId, EngineError> {
        let offsets = composer.compose(description).inspect_err(|err| {
            tracing::warn!(error = %err, "motif generation failed");
        })?;
        self.next_generated += 1;
        let id = PlaybackId::Generated(self.next_generated);
        self.toggle_playback(id.clone(), &PlaybackSource::Motif(offsets));
        Ok(id)
    }

    // --- archive ---

    pub fn archived(&self) -> Result<Vec<Timeline>, EngineError> {
        Ok(self.archive.list()?)
    }

    /// Have `analyst` name an archived take and store the result on it.
    pub fn annotate(
        &mut self,
        id: TimelineId,
        analyst: &impl Analyst,
    ) -> Result<Analysis, EngineError> {
        let timeline = self.archive.get(id)?;
        let analysis = analyst
            .analyze(&timeline.distinct_pitches())
            .inspect_err(|err| tracing::warn!(%id, error = %err, "analysis failed"))?;
        self.archive.update_name_and_annotation(
            id,
            analysis.suggested_name.clone(),
            Some(analysis.mood_summary.clone()),
        )?;
        tracing::info!(%id, name = %analysis.suggested_name, "take annotated");
        Ok(analysis)
    }

    pub fn rename(&mut self, id: TimelineId, name: impl Into<String>) -> Result<(), EngineError> {
        let timeline = self.archive.get(id)?;
        self.archive
            .update_name_and_annotation(id, name.into(), timeline.annotation)?;
        Ok(())
    }

    /// Delete an archived take, stopping it first if it is playing.
    pub fn remove(&mut self, id: TimelineId) -> Result<Timeline, EngineError> {
        if self.playback.is_playing(&PlaybackId::Archived(id)) {
            self.stop_playback();
        }
        Ok(self.archive.remove(id)?)
    }

    // --- time ---

    /// Carry out everything that has come due.
    pub fn tick(&mut self) -> Vec<Notice> {
        let now = self.now();
        let mut notices = Vec::new();
        while let Some((_, deferred)) = self.timers.pop_due(now) {
            let notice = match deferred {
                Deferred::Playback(cue) => self
                    .playback
                    .fire(cue, &mut self.tones)
                    .map(Notice::PlaybackFinished),
                Deferred::RecordingDeadline(id) => self.recording_deadline(id, now),
            };
            notices.extend(notice);
        }
        notices
    }

    /// When the next deferred action is due, for front ends that sleep.
    pub fn next_due(&self) -> Option<u64> {
        self.timers.next_due()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        archive::MemoryArchive,
        config::{EngineConfig, RecordingConfig},
        engine::clock::ManualClock,
        synth::ToneLog,
        timeline::TimelineEvent,
    };

    fn engine(max_duration_ms: Option<u64>) -> (Engine<ToneLog>, ManualClock) {
        let clock = ManualClock::new();
        let config = EngineConfig {
            recording: RecordingConfig { max_duration_ms },
            ..EngineConfig::default()
        };
        let engine = Engine::new(
            config,
            clock.clone(),
            ToneLog::new(clock.clone()),
            MemoryArchive::new(),
        );
        (engine, clock)
    }

    #[test]
    fn budget_counts_active_time_only() {
        let (mut engine, clock) = engine(Some(1_000));
        engine.start_recording().unwrap();
        engine.press(Pitch(60));

        clock.set(400);
        engine.pause_recording().unwrap();
        clock.set(1_500);
        assert!(engine.tick().is_empty(), "deadline fired while paused");
        assert_eq!(engine.recording_status(), RecordingStatus::Paused);

        engine.resume_recording().unwrap();
        clock.set(2_099);
        assert!(engine.tick().is_empty());

        clock.set(2_100);
        let notices = engine.tick();
        match notices.as_slice() {
            [Notice::RecordingSaved(timeline)] => {
                assert_eq!(timeline.events, vec![TimelineEvent::note_on(0, Pitch(60))]);
            }
            other => panic!("unexpected notices {other:?}"),
        }
        assert_eq!(engine.recording_status(), RecordingStatus::Idle);
    }

    #[test]
    fn stale_deadline_leaves_the_next_take_alone() {
        let (mut engine, clock) = engine(Some(1_000));
        engine.start_recording().unwrap();
        assert!(engine.stop_recording().unwrap().is_none());

        clock.set(500);
        engine.start_recording().unwrap();
        clock.set(1_000);
        assert!(engine.tick().is_empty());
        assert_eq!(engine.recording_status(), RecordingStatus::Active);
    }

    #[test]
    fn empty_take_hitting_the_budget_is_discarded() {
        let (mut engine, clock) = engine(Some(200));
        engine.start_recording().unwrap();
        clock.set(200);
        assert!(matches!(engine.tick().as_slice(), [Notice::RecordingDiscarded]));
        assert!(engine.archived().unwrap().is_empty());
    }

    #[test]
    fn toggle_pause_needs_a_take() {
        let (mut engine, _clock) = engine(None);
        assert!(matches!(
            engine.toggle_pause(),
            Err(EngineError::Session(SessionError::InvalidTransition {
                status: RecordingStatus::Idle,
                ..
            }))
        ));
        engine.start_recording().unwrap();
        assert_eq!(engine.toggle_pause().unwrap(), RecordingStatus::Paused);
        assert_eq!(engine.toggle_pause().unwrap(), RecordingStatus::Active);
    }

    /// Saves work but listing always fails.
    #[derive(Default)]
    struct UnlistableArchive {
        saved: Vec<Timeline>,
    }

    impl ArchiveStore for UnlistableArchive {
        fn list(&self) -> Result<Vec<Timeline>, ArchiveError> {
            Err(ArchiveError::InvalidNamespace("unreadable".into()))
        }

        fn save(&mut self, timeline: Timeline) -> Result<(), ArchiveError> {
            self.saved.push(timeline);
            Ok(())
        }

        fn remove(&mut self, id: TimelineId) -> Result<Timeline, ArchiveError> {
            Err(ArchiveError::NotFound(id))
        }

        fn update_name_and_annotation(
            &mut self,
            id: TimelineId,
            _name: String,
            _annotation: Option<String>,
        ) -> Result<(), ArchiveError> {
            Err(ArchiveError::NotFound(id))
        }
    }

    #[test]
    fn take_is_saved_even_when_the_archive_cannot_list() {
        let clock = ManualClock::new();
        let mut engine = Engine::new(
            EngineConfig::default(),
            clock.clone(),
            ToneLog::new(clock.clone()),
            UnlistableArchive::default(),
        );
        engine.start_recording().unwrap();
        engine.press(Pitch(60));
        let take = engine.stop_recording().unwrap().unwrap();
        assert_eq!(take.name, "User Mix 1");
        assert_eq!(take.events.len(), 1);
    }

    #[test]
    fn second_start_is_refused() {
        let (mut engine, _clock) = engine(None);
        engine.start_recording().unwrap();
        assert!(engine.start_recording().is_err());
    }

    #[test]
    fn unknown_library_index_is_an_error() {
        let (mut engine, _clock) = engine(None);
        assert!(matches!(
            engine.play_library(10_000),
            Err(EngineError::NoSuchEntry(10_000))
        ));
        assert_eq!(engine.active_playback(), None);
    }
}
