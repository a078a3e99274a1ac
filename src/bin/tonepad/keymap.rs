//! Computer keyboard to pitch, tracker style.
//!
//! ```text
//!  2 3   5 6 7        s d   g h j
//! q w e r t y u i    z x c v b n m ,
//! ```
//!
//! The upper row starts an octave above the lower one.

use tonepad::timeline::Pitch;

const LOWER_ROW: &str = "zsxdcvgbhnjm,";
const UPPER_ROW: &str = "q2w3er5t6y7ui";

pub struct KeyMap {
    /// MIDI note of the lower row's first key.
    base: u8,
}

impl KeyMap {
    const LOWEST_BASE: u8 = 12;
    const HIGHEST_BASE: u8 = 96;

    pub fn new() -> Self {
        Self { base: 48 }
    }

    pub fn pitch(&self, key: char) -> Option<Pitch> {
        let key = key.to_ascii_lowercase();
        let (row_base, index) = if let Some(i) = LOWER_ROW.find(key) {
            (self.base, i)
        } else {
            (self.base + 12, UPPER_ROW.find(key)?)
        };
        Pitch(row_base).transpose(index as i32)
    }

    pub fn shift_octave(&mut self, up: bool) {
        self.base = if up {
            (self.base + 12).min(Self::HIGHEST_BASE)
        } else {
            self.base.saturating_sub(12).max(Self::LOWEST_BASE)
        };
    }

    /// Lowest and highest pitch the keys currently reach.
    pub fn range(&self) -> (Pitch, Pitch) {
        (Pitch(self.base), Pitch(self.base + 24))
    }
}
