//! User configuration.
//!
//! Everything is optional: a missing file, a missing section or a missing
//! key all fall back to the defaults below.
//!
//! ```toml
//! [recording]
//! max_duration_ms = 30000
//!
//! [tone]
//! waveform = "sine"
//! gain = 0.2
//!
//! [assist]
//! command = ["llm", "-m", "small"]
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dsp::OscillatorWaveform;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config in {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotepadConfig {
    pub recording: RecordingConfig,
    pub playback: PlaybackConfig,
    pub motif: MotifConfig,
    pub tone: ToneConfig,
    pub archive: ArchiveConfig,
    pub assist: AssistConfig,
}

impl NotepadConfig {
    /// `<config dir>/tonepad/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tonepad").join("config.toml"))
    }

    /// Load `path`, or the defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_owned(),
                    source,
                })
            }
        };
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// The part of the configuration the engine core consumes.
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            recording: self.recording.clone(),
            playback: self.playback.clone(),
            motif: self.motif.clone(),
        }
    }
}

/// Settings for the engine core.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub recording: RecordingConfig,
    pub playback: PlaybackConfig,
    pub motif: MotifConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Active (unpaused) time after which a take saves itself. `None`
    /// records until stopped.
    pub max_duration_ms: Option<u64>,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            max_duration_ms: Some(20_000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// How long a note left held at the end of a take keeps sounding after
    /// the take's last event.
    pub timeline_hold_ms: u64,
    /// Delay after the last note before playback reports itself finished.
    pub completion_grace_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            timeline_hold_ms: 1_200,
            completion_grace_ms: 1_000,
        }
    }
}

/// How a motif's relative offsets become notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotifConfig {
    /// Offset 0 plays this MIDI note (55 = G3).
    pub root: u8,
    pub spacing_ms: u64,
    pub sustain_ms: u64,
}

impl Default for MotifConfig {
    fn default() -> Self {
        Self {
            root: 55,
            spacing_ms: 200,
            sustain_ms: 500,
        }
    }
}

/// The synth patch and its polyphony.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneConfig {
    pub waveform: OscillatorWaveform,
    pub attack_ms: u32,
    pub release_ms: u32,
    pub gain: f32,
    pub max_voices: usize,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            waveform: OscillatorWaveform::Triangle,
            attack_ms: 50,
            release_ms: 200,
            gain: 0.25,
            max_voices: 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Where archive files live. Defaults to `<data dir>/tonepad`.
    pub dir: Option<PathBuf>,
    pub namespace: String,
}

impl ArchiveConfig {
    pub fn resolved_dir(&self) -> Option<PathBuf> {
        self.dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("tonepad")))
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            dir: None,
            namespace: "performances".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistConfig {
    /// Program and arguments of the text service. Empty = not configured.
    pub command: Vec<String>,
}
