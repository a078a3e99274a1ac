use std::fmt;

use serde::{Deserialize, Serialize};

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Semitone index of a key (MIDI numbering, middle C = 60).
///
/// The number is the whole identity of a pitch: events copy it by value and
/// nothing ever mutates it once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pitch(pub u8);

impl Pitch {
    /// Highest pitch the MIDI range can express.
    pub const MAX: Pitch = Pitch(127);

    /// A4, the 440 Hz tuning reference.
    pub const A4: Pitch = Pitch(69);

    /// Middle C.
    pub const C4: Pitch = Pitch(60);

    pub fn midi(self) -> u8 {
        self.0
    }

    /// Move by `semitones`, or `None` when the result leaves 0..=127.
    pub fn transpose(self, semitones: i32) -> Option<Pitch> {
        let target = self.0 as i32 + semitones;
        if (0..=Self::MAX.0 as i32).contains(&target) {
            Some(Pitch(target as u8))
        } else {
            None
        }
    }

    /// Equal-tempered frequency in Hz, A4 = 440 Hz.
    #[inline]
    pub fn frequency(self) -> f32 {
        440.0 * 2.0_f32.powf((self.0 as f32 - 69.0) / 12.0)
    }

    /// Pitch class without octave ("C", "C#", ...).
    pub fn class_name(self) -> &'static str {
        NOTE_NAMES[(self.0 % 12) as usize]
    }

    /// Octave number in scientific notation (C4 = 60).
    pub fn octave(self) -> i8 {
        (self.0 / 12) as i8 - 1
    }

    /// True for the black keys of a piano keyboard.
    pub fn is_sharp(self) -> bool {
        self.class_name().ends_with('#')
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class_name(), self.octave())
    }
}

impl From<u8> for Pitch {
    fn from(value: u8) -> Self {
        Pitch(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_440() {
        assert!((Pitch::A4.frequency() - 440.0).abs() < 1e-3);
        assert!((Pitch(81).frequency() - 880.0).abs() < 1e-2);
    }

    #[test]
    fn names_follow_scientific_notation() {
        assert_eq!(Pitch::C4.to_string(), "C4");
        assert_eq!(Pitch(36).to_string(), "C2");
        assert_eq!(Pitch(61).to_string(), "C#4");
        assert_eq!(Pitch(0).to_string(), "C-1");
        assert!(Pitch(61).is_sharp());
        assert!(!Pitch(64).is_sharp());
    }

    #[test]
    fn transpose_stays_in_midi_range() {
        assert_eq!(Pitch(55).transpose(12), Some(Pitch(67)));
        assert_eq!(Pitch(55).transpose(-2), Some(Pitch(53)));
        assert_eq!(Pitch(5).transpose(-6), None);
        assert_eq!(Pitch(120).transpose(8), None);
    }
}
