use std::collections::BTreeMap;

use crate::{
    engine::clock::Clock,
    synth::source::{ToneSource, VoiceHandle, VoiceId},
    timeline::Pitch,
};

/// One request made to a [`ToneLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneCall {
    Acquire {
        at: u64,
        voice: VoiceId,
        pitch: Pitch,
    },
    AcquireTimed {
        at: u64,
        voice: VoiceId,
        pitch: Pitch,
        duration_ms: u64,
    },
    Release {
        at: u64,
        voice: VoiceId,
        /// False when the voice had already been released or run out.
        was_sounding: bool,
    },
}

#[derive(Debug, Clone, Copy)]
struct Sounding {
    pitch: Pitch,
    until: Option<u64>,
}

/// A silent [`ToneSource`] that remembers what it was asked to play.
///
/// Timed voices stop sounding once the clock passes their end, the same way
/// the real synth lets them run out.
pub struct ToneLog {
    clock: Box<dyn Clock>,
    next_id: u64,
    calls: Vec<ToneCall>,
    sounding: BTreeMap<VoiceId, Sounding>,
}

impl ToneLog {
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            next_id: 0,
            calls: Vec::new(),
            sounding: BTreeMap::new(),
        }
    }

    pub fn calls(&self) -> &[ToneCall] {
        &self.calls
    }

    /// Voices audible right now.
    pub fn sounding(&self) -> Vec<(VoiceId, Pitch)> {
        let now = self.clock.now_ms();
        self.sounding
            .iter()
            .filter(|(_, s)| s.until.map_or(true, |until| until > now))
            .map(|(id, s)| (*id, s.pitch))
            .collect()
    }

    pub fn is_silent(&self) -> bool {
        self.sounding().is_empty()
    }

    /// Every pitch that was started, in call order.
    pub fn struck(&self) -> Vec<Pitch> {
        self.calls
            .iter()
            .filter_map(|call| match *call {
                ToneCall::Acquire { pitch, .. } | ToneCall::AcquireTimed { pitch, .. } => {
                    Some(pitch)
                }
                ToneCall::Release { .. } => None,
            })
            .collect()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn next_voice(&mut self) -> VoiceId {
        self.next_id += 1;
        VoiceId(self.next_id)
    }
}

impl ToneSource for ToneLog {
    fn acquire(&mut self, pitch: Pitch) -> VoiceHandle {
        let voice = self.next_voice();
        let at = self.clock.now_ms();
        self.calls.push(ToneCall::Acquire { at, voice, pitch });
        self.sounding.insert(voice, Sounding { pitch, until: None });
        VoiceHandle::new(voice, pitch)
    }

    fn acquire_timed(&mut self, pitch: Pitch, duration_ms: u64) -> VoiceHandle {
        let voice = self.next_voice();
        let at = self.clock.now_ms();
        self.calls.push(ToneCall::AcquireTimed {
            at,
            voice,
            pitch,
            duration_ms,
        });
        self.sounding.insert(
            voice,
            Sounding {
                pitch,
                until: Some(at + duration_ms),
            },
        );
        VoiceHandle::new(voice, pitch)
    }

    fn release(&mut self, voice: VoiceHandle) {
        let at = self.clock.now_ms();
        let was_sounding = self
            .sounding
            .remove(&voice.id())
            .is_some_and(|s| s.until.map_or(true, |until| until > at));
        self.calls.push(ToneCall::Release {
            at,
            voice: voice.id(),
            was_sounding,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::clock::ManualClock;

    #[test]
    fn timed_voices_run_out() {
        let clock = ManualClock::new();
        let mut log = ToneLog::new(clock.clone());
        let voice = log.acquire_timed(Pitch(67), 500);
        assert_eq!(log.sounding(), vec![(voice.id(), Pitch(67))]);

        clock.advance(500);
        assert!(log.is_silent());

        log.release(voice);
        assert_eq!(
            log.calls().last(),
            Some(&ToneCall::Release {
                at: 500,
                voice: voice.id(),
                was_sounding: false
            })
        );
    }

    #[test]
    fn double_release_is_recorded_but_harmless() {
        let mut log = ToneLog::new(ManualClock::new());
        let voice = log.acquire(Pitch(60));
        log.release(voice);
        log.release(voice);

        let releases: Vec<bool> = log
            .calls()
            .iter()
            .filter_map(|c| match c {
                ToneCall::Release { was_sounding, .. } => Some(*was_sounding),
                _ => None,
            })
            .collect();
        assert_eq!(releases, vec![true, false]);
        assert!(log.is_silent());
    }
}
