//! The built-in tone library: short named motifs to audition.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Genre {
    GamingClassics,
    ViralPop,
    AsmrNature,
    MinimalistUi,
    CinematicEffects,
    RetroLofi,
}

impl Genre {
    pub const ALL: [Genre; 6] = [
        Genre::GamingClassics,
        Genre::ViralPop,
        Genre::AsmrNature,
        Genre::MinimalistUi,
        Genre::CinematicEffects,
        Genre::RetroLofi,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Genre::GamingClassics => "Gaming Classics",
            Genre::ViralPop => "Viral Pop Snippets",
            Genre::AsmrNature => "ASMR & Nature",
            Genre::MinimalistUi => "Minimalist UI",
            Genre::CinematicEffects => "Cinematic Effects",
            Genre::RetroLofi => "Retro & Lofi",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToneEntry {
    pub name: String,
    pub genre: Genre,
    /// Semitone offsets from the motif root.
    pub motif: Vec<i32>,
}

impl ToneEntry {
    fn new(name: &str, genre: Genre, motif: &[i32]) -> Self {
        Self {
            name: name.to_owned(),
            genre,
            motif: motif.to_vec(),
        }
    }
}

const MOODS: [&str; 8] = [
    "Mystic", "Cyber", "Happy", "Sad", "Urgent", "Dreamy", "Vintage", "Liquid",
];
const STYLES: [&str; 5] = ["Notification", "Alert", "Loop", "Signature", "Ping"];

#[derive(Debug, Clone)]
pub struct ToneLibrary {
    entries: Vec<ToneEntry>,
}

impl ToneLibrary {
    /// The curated presets followed by 100 generated ones.
    pub fn builtin() -> Self {
        use Genre::*;

        let mut entries = vec![
            ToneEntry::new("Super Mario Jump", GamingClassics, &[0, 12, 24]),
            ToneEntry::new("Pikachu Pika!", GamingClassics, &[12, 14, 12]),
            ToneEntry::new("Sonic Ring", GamingClassics, &[0, 4, 7, 12, 16, 24]),
            ToneEntry::new("Zelda Secret", GamingClassics, &[5, 4, 1, 6, 5, 1, 8, 7]),
            ToneEntry::new("Final Fantasy Fanfare", GamingClassics, &[0, 0, 0, 0, -2, -4, 0]),
            ToneEntry::new("Frozen Elsa Arp", ViralPop, &[0, 7, 12, 16, 12, 7]),
            ToneEntry::new("Wednesday Snap", ViralPop, &[0, 1, 0]),
            ToneEntry::new("Encanto Sun", ViralPop, &[0, 3, 7, 10, 12]),
            ToneEntry::new("Bad Guy - Billie", ViralPop, &[0, 0, 3, 5, 0, 0, 6, 5, 3]),
            ToneEntry::new("Shape of You", ViralPop, &[4, 6, 4, 6, 4, 1, -1]),
            ToneEntry::new("Crystal Stream", AsmrNature, &[12, 14, 16, 19, 21, 24]),
            ToneEntry::new("Deep Forest Zen", AsmrNature, &[0, 7, 12]),
            ToneEntry::new("Morning Windchime", AsmrNature, &[24, 21, 17, 12]),
            ToneEntry::new("Tibetan Bowl", AsmrNature, &[0]),
            ToneEntry::new("Banking Success", MinimalistUi, &[0, 12, 15]),
            ToneEntry::new("Apple Pay Style", MinimalistUi, &[12, 17]),
            ToneEntry::new("Shopping Confirm", MinimalistUi, &[7, 12]),
            ToneEntry::new("Email Sent", MinimalistUi, &[12, 19]),
            ToneEntry::new("Star Wars Theme", CinematicEffects, &[0, 7, 5, 4, 2, 12, 7]),
            ToneEntry::new("Stranger Things", CinematicEffects, &[0, 4, 7, 11, 12, 11, 7, 4]),
            ToneEntry::new("Mission Impossible", CinematicEffects, &[0, 0, 3, 5, 0, 0, -2, -1]),
        ];

        entries.extend((1..=100).map(|i: usize| {
            let genre = match i {
                1..=25 => RetroLofi,
                26..=50 => MinimalistUi,
                51..=75 => AsmrNature,
                _ => CinematicEffects,
            };
            let n = i as i32;
            ToneEntry {
                name: format!("{} {} {i}", MOODS[i % MOODS.len()], STYLES[i % STYLES.len()]),
                genre,
                motif: vec![n % 12, (n + 5) % 12, (n + 12) % 12],
            }
        }));

        Self { entries }
    }

    pub fn entries(&self) -> &[ToneEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&ToneEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose name contains `query` (ignoring case) and, when given,
    /// whose genre is `genre`. Indices refer to [`ToneLibrary::get`].
    pub fn search<'a>(
        &'a self,
        query: &str,
        genre: Option<Genre>,
    ) -> impl Iterator<Item = (usize, &'a ToneEntry)> + 'a {
        let query = query.to_lowercase();
        self.entries
            .iter()
            .enumerate()
            .filter(move |(_, e)| {
                genre.map_or(true, |g| e.genre == g) && e.name.to_lowercase().contains(&query)
            })
    }
}

impl Default for ToneLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}
