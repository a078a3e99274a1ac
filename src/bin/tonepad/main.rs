//! tonepad - terminal musical notepad
//!
//! Run with: cargo run -- [--config <path>] [--silent] [--ephemeral]

mod app;
mod audio;
mod keymap;
mod ui;

use std::{fs, path::PathBuf, sync::Mutex};

use clap::Parser;
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use app::App;
use tonepad::{
    archive::{ArchiveStore, JsonArchive, MemoryArchive},
    assist::CommandTextService,
    config::NotepadConfig,
    engine::{clock::SystemClock, Engine},
    synth::ToneLog,
};

#[derive(Debug, Parser)]
#[command(name = "tonepad")]
#[command(about = "Terminal musical notepad", long_about = None)]
struct Options {
    /// Config file (default: <config dir>/tonepad/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// No audio device: notes go to a log instead
    #[arg(long)]
    silent: bool,

    /// Keep takes in memory only
    #[arg(long)]
    ephemeral: bool,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let options = Options::parse();

    let config = match options.config.clone().or_else(NotepadConfig::default_path) {
        Some(path) => NotepadConfig::load(&path)?,
        None => NotepadConfig::default(),
    };
    let data_dir = config
        .archive
        .resolved_dir()
        .ok_or_else(|| eyre!("no data directory; set [archive] dir in the config"))?;
    setup_tracing(&data_dir)?;

    let archive: Box<dyn ArchiveStore> = if options.ephemeral {
        Box::new(MemoryArchive::new())
    } else {
        Box::new(JsonArchive::open(&data_dir, &config.archive.namespace)?)
    };
    let assist = CommandTextService::new(config.assist.command.clone());
    let clock = SystemClock::new();

    let mut terminal = ratatui::init();
    let result = if options.silent {
        let engine = Engine::new(config.engine(), clock, ToneLog::new(clock), archive);
        App::new(engine, assist, None).run(&mut terminal)
    } else {
        audio::start(&config.tone).and_then(|(output, tones)| {
            let engine = Engine::new(config.engine(), clock, tones, archive);
            // the stream keeps playing until `output` drops at the end of this closure
            App::new(engine, assist, Some(output.scope)).run(&mut terminal)
        })
    };
    ratatui::restore();
    result
}

/// Log to `<data dir>/tonepad.log`; the terminal belongs to the UI.
/// The filter comes from `TONEPAD_LOG` (e.g. `TONEPAD_LOG=tonepad=debug`).
fn setup_tracing(dir: &std::path::Path) -> EyreResult<()> {
    fs::create_dir_all(dir).wrap_err_with(|| format!("creating {}", dir.display()))?;
    let path = dir.join("tonepad.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .wrap_err_with(|| format!("opening log file {}", path.display()))?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_env("TONEPAD_LOG"))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish();
    tracing::subscriber::set_global_default(subscriber).wrap_err("installing log subscriber")
}
