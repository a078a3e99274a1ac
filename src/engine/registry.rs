use std::collections::HashMap;

use crate::{
    synth::{ToneSource, VoiceHandle},
    timeline::Pitch,
};

/// Voices for keys the player is holding down, one per pitch.
///
/// Pressing a held pitch again does nothing; releasing a pitch that is not
/// held does nothing. The entry is dropped as soon as the release is sent, so
/// the same key can sound again immediately while the old voice fades.
///
/// Playback keeps its own voices; a pitch held here and the same pitch
/// sounding from a replay never interfere.
#[derive(Debug, Default)]
pub struct VoiceRegistry {
    held: HashMap<Pitch, VoiceHandle>,
}

impl VoiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a sustained voice for `pitch`. Returns false if it was already
    /// sounding.
    pub fn press(&mut self, pitch: Pitch, tones: &mut impl ToneSource) -> bool {
        if self.held.contains_key(&pitch) {
            return false;
        }
        let voice = tones.acquire(pitch);
        self.held.insert(pitch, voice);
        true
    }

    /// Fade out the voice for `pitch`. Returns false if nothing was held.
    pub fn release(&mut self, pitch: Pitch, tones: &mut impl ToneSource) -> bool {
        match self.held.remove(&pitch) {
            Some(voice) => {
                tones.release(voice);
                true
            }
            None => false,
        }
    }

    /// Release every held key, returning the pitches in ascending order.
    pub fn release_all(&mut self, tones: &mut impl ToneSource) -> Vec<Pitch> {
        let mut released: Vec<_> = self.held.drain().collect();
        released.sort_by_key(|(pitch, _)| *pitch);
        released
            .into_iter()
            .map(|(pitch, voice)| {
                tones.release(voice);
                pitch
            })
            .collect()
    }

    pub fn is_held(&self, pitch: Pitch) -> bool {
        self.held.contains_key(&pitch)
    }

    /// Held pitches, lowest first.
    pub fn held(&self) -> Vec<Pitch> {
        let mut pitches: Vec<_> = self.held.keys().copied().collect();
        pitches.sort();
        pitches
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{engine::clock::ManualClock, synth::ToneLog};

    #[test]
    fn repeated_press_keeps_one_voice() {
        let mut tones = ToneLog::new(ManualClock::new());
        let mut keys = VoiceRegistry::new();

        assert!(keys.press(Pitch(60), &mut tones));
        assert!(!keys.press(Pitch(60), &mut tones));

        assert_eq!(tones.struck(), vec![Pitch(60)]);
        assert_eq!(keys.held(), vec![Pitch(60)]);
    }

    #[test]
    fn release_is_idempotent() {
        let mut tones = ToneLog::new(ManualClock::new());
        let mut keys = VoiceRegistry::new();

        keys.press(Pitch(64), &mut tones);
        assert!(keys.release(Pitch(64), &mut tones));
        assert!(!keys.release(Pitch(64), &mut tones));
        assert!(tones.is_silent());
        assert!(keys.is_empty());

        // the key can be struck again right away
        assert!(keys.press(Pitch(64), &mut tones));
        assert_eq!(tones.struck(), vec![Pitch(64), Pitch(64)]);
    }

    #[test]
    fn release_all_silences_everything() {
        let mut tones = ToneLog::new(ManualClock::new());
        let mut keys = VoiceRegistry::new();
        for midi in [67, 60, 64] {
            keys.press(Pitch(midi), &mut tones);
        }

        assert_eq!(
            keys.release_all(&mut tones),
            vec![Pitch(60), Pitch(64), Pitch(67)]
        );
        assert!(tones.is_silent());
        assert_eq!(keys.len(), 0);
    }
}
