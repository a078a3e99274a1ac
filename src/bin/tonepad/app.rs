//! Application state and the event loop.

use std::{
    collections::HashMap,
    io::stdout,
    time::{Duration, Instant},
};

use color_eyre::eyre::Result as EyreResult;
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::supports_keyboard_enhancement,
};
use ratatui::DefaultTerminal;
use rtrb::Consumer;

use tonepad::{
    assist::{CommandTextService, PromptAnalyst, PromptComposer},
    engine::{session::RecordingStatus, Engine, Notice},
    library::Genre,
    synth::ToneSource,
    timeline::{Pitch, Timeline, TimelineId},
};

use crate::{
    keymap::KeyMap,
    ui::{self, Pane, View},
};

/// ~60fps
const FRAME: Duration = Duration::from_millis(16);
/// Without key-up events a key sounds this long after its last press
/// (or auto-repeat).
const TAP_HOLD: Duration = Duration::from_millis(500);
const SCOPE_LEN: usize = 1024;

enum Input {
    Rename { id: TimelineId, text: String },
    Compose { text: String },
    Search,
}

/// Slow collaborator calls, run after the frame that announces them.
enum Pending {
    Analyze(TimelineId),
    Compose(String),
}

pub struct App<T: ToneSource> {
    engine: Engine<T>,
    assist: CommandTextService,
    keys: KeyMap,
    scope_rx: Option<Consumer<f32>>,
    scope: Vec<f32>,
    focus: Pane,
    search: String,
    genre: Option<Genre>,
    library_view: Vec<usize>,
    library_selected: usize,
    archive: Vec<Timeline>,
    archive_selected: usize,
    input: Option<Input>,
    pending: Option<Pending>,
    message: String,
    /// Present when the terminal cannot report key releases.
    taps: Option<HashMap<Pitch, Instant>>,
    should_quit: bool,
}

impl<T: ToneSource> App<T> {
    pub fn new(engine: Engine<T>, assist: CommandTextService, scope_rx: Option<Consumer<f32>>) -> Self {
        let library_view = (0..engine.library().len()).collect();
        Self {
            engine,
            assist,
            keys: KeyMap::new(),
            scope_rx,
            scope: vec![0.0; SCOPE_LEN],
            focus: Pane::Library,
            search: String::new(),
            genre: None,
            library_view,
            library_selected: 0,
            archive: Vec::new(),
            archive_selected: 0,
            input: None,
            pending: None,
            message: String::new(),
            taps: None,
            should_quit: false,
        }
    }

    pub fn run(mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        let enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
        if enhanced {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        } else {
            tracing::info!("terminal does not report key releases, using tap mode");
            self.taps = Some(HashMap::new());
        }
        self.refresh_archive();

        let result = self.event_loop(terminal);

        if enhanced {
            execute!(stdout(), PopKeyboardEnhancementFlags)?;
        }
        self.shutdown();
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_scope();
            self.expire_taps();
            for notice in self.engine.tick() {
                self.on_notice(notice);
            }

            terminal.draw(|frame| ui::render(frame, &self.view()))?;

            if let Some(pending) = self.pending.take() {
                self.run_pending(pending);
                continue;
            }

            if event::poll(FRAME)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key),
                    Event::FocusLost => self.release_keys(),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Save a take in progress rather than lose it.
    fn shutdown(&mut self) {
        self.release_keys();
        self.engine.stop_playback();
        match self.engine.stop_recording() {
            Ok(Some(timeline)) => tracing::info!(name = %timeline.name, "saved take on exit"),
            Ok(None) => {}
            Err(err) => tracing::error!(error = %err, "take lost on exit"),
        }
    }

    fn poll_scope(&mut self) {
        let Some(rx) = self.scope_rx.as_mut() else {
            return;
        };
        while let Ok(sample) = rx.pop() {
            self.scope.push(sample);
        }
        if self.scope.len() > SCOPE_LEN {
            let excess = self.scope.len() - SCOPE_LEN;
            self.scope.drain(0..excess);
        }
    }

    fn expire_taps(&mut self) {
        let Some(taps) = self.taps.as_mut() else {
            return;
        };
        let now = Instant::now();
        let expired: Vec<Pitch> = taps
            .iter()
            .filter(|(_, until)| **until <= now)
            .map(|(pitch, _)| *pitch)
            .collect();
        for pitch in expired {
            taps.remove(&pitch);
            self.engine.release(pitch);
        }
    }

    fn release_keys(&mut self) {
        if let Some(taps) = self.taps.as_mut() {
            taps.clear();
        }
        self.engine.release_all_keys();
    }

    fn on_notice(&mut self, notice: Notice) {
        match notice {
            Notice::RecordingSaved(timeline) => {
                self.message = format!("time limit reached, saved \"{}\"", timeline.name);
                self.refresh_archive();
            }
            Notice::RecordingDiscarded => {
                self.message = "time limit reached, nothing was recorded".into();
            }
            Notice::RecordingFailed(err) => {
                self.message = format!("could not save recording: {err}");
            }
            Notice::PlaybackFinished(id) => {
                tracing::debug!(%id, "playback finished");
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.input.is_some() {
            if key.kind != KeyEventKind::Release {
                self.handle_input(key);
            }
            return;
        }

        let pitch = match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => self.keys.pitch(c),
            _ => None,
        };

        match (key.kind, pitch) {
            (KeyEventKind::Release, Some(pitch)) => {
                self.engine.release(pitch);
            }
            (KeyEventKind::Release, None) => {}
            (_, Some(pitch)) => self.note_down(pitch),
            (KeyEventKind::Press, None) => self.handle_command(key),
            _ => {}
        }
    }

    fn note_down(&mut self, pitch: Pitch) {
        if let Some(taps) = self.taps.as_mut() {
            taps.insert(pitch, Instant::now() + TAP_HOLD);
        }
        // repeats of a held key are ignored by the engine
        self.engine.press(pitch);
    }

    fn handle_command(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::F(1) => self.toggle_recording(),
            KeyCode::F(2) => match self.engine.toggle_pause() {
                Ok(status) => self.message = status.to_string(),
                Err(err) => self.message = err.to_string(),
            },
            KeyCode::F(3) => {
                if let Some(id) = self.selected_timeline() {
                    self.message = "asking for a name...".into();
                    self.pending = Some(Pending::Analyze(id));
                }
            }
            KeyCode::F(4) => {
                self.input = Some(Input::Compose {
                    text: String::new(),
                })
            }
            KeyCode::F(5) => {
                if let Some(timeline) = self.archive.get(self.archive_selected) {
                    self.input = Some(Input::Rename {
                        id: timeline.id,
                        text: timeline.name.clone(),
                    });
                }
            }
            KeyCode::F(6) => {
                self.focus = Pane::Library;
                self.input = Some(Input::Search);
            }
            KeyCode::F(7) => self.cycle_genre(),
            KeyCode::Enter => self.toggle_selected(),
            KeyCode::Delete => self.remove_selected(),
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Pane::Library => Pane::Archive,
                    Pane::Archive => Pane::Library,
                }
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Left | KeyCode::Right => {
                self.release_keys();
                self.keys.shift_octave(key.code == KeyCode::Right);
            }
            _ => {}
        }
    }

    fn handle_input(&mut self, key: KeyEvent) {
        let Some(input) = self.input.as_mut() else {
            return;
        };
        let text = match input {
            Input::Rename { text, .. } | Input::Compose { text } => text,
            Input::Search => &mut self.search,
        };
        match key.code {
            KeyCode::Char(c) => text.push(c),
            KeyCode::Backspace => {
                text.pop();
            }
            KeyCode::Esc => {
                self.input = None;
                return;
            }
            KeyCode::Enter => {
                if let Some(input) = self.input.take() {
                    self.commit_input(input);
                }
                return;
            }
            _ => return,
        }
        if matches!(input, Input::Search) {
            self.refilter();
        }
    }

    fn commit_input(&mut self, input: Input) {
        match input {
            Input::Rename { id, text } => {
                let name = text.trim();
                if name.is_empty() {
                    return;
                }
                match self.engine.rename(id, name) {
                    Ok(()) => self.refresh_archive(),
                    Err(err) => self.message = err.to_string(),
                }
            }
            Input::Compose { text } => {
                let description = text.trim().to_owned();
                if description.is_empty() {
                    self.message = "describe a vibe first".into();
                } else {
                    self.message = "composing...".into();
                    self.pending = Some(Pending::Compose(description));
                }
            }
            Input::Search => {}
        }
    }

    fn run_pending(&mut self, pending: Pending) {
        match pending {
            Pending::Analyze(id) => {
                let analyst = PromptAnalyst::new(self.assist.clone());
                match self.engine.annotate(id, &analyst) {
                    Ok(analysis) => {
                        self.message = format!("{}: {}", analysis.suggested_name, analysis.mood_summary);
                        self.refresh_archive();
                    }
                    Err(err) => self.message = err.to_string(),
                }
            }
            Pending::Compose(description) => {
                let composer = PromptComposer::new(self.assist.clone());
                match self.engine.play_generated(&description, &composer) {
                    Ok(_) => self.message = format!("playing \"{description}\""),
                    Err(err) => self.message = err.to_string(),
                }
            }
        }
    }

    fn toggle_recording(&mut self) {
        if self.engine.recording_status() == RecordingStatus::Idle {
            match self.engine.start_recording() {
                Ok(_) => self.message = "recording".into(),
                Err(err) => self.message = err.to_string(),
            }
            return;
        }
        match self.engine.stop_recording() {
            Ok(Some(timeline)) => {
                self.message = format!("saved \"{}\"", timeline.name);
                self.refresh_archive();
                self.archive_selected = self.archive.len().saturating_sub(1);
            }
            Ok(None) => self.message = "nothing recorded".into(),
            Err(err) => self.message = err.to_string(),
        }
    }

    fn toggle_selected(&mut self) {
        let result = match self.focus {
            Pane::Library => match self.library_view.get(self.library_selected) {
                Some(&index) => self.engine.play_library(index),
                None => return,
            },
            Pane::Archive => match self.selected_timeline() {
                Some(id) => self.engine.play_timeline(id),
                None => return,
            },
        };
        if let Err(err) = result {
            self.message = err.to_string();
        }
    }

    fn remove_selected(&mut self) {
        if self.focus != Pane::Archive {
            return;
        }
        let Some(id) = self.selected_timeline() else {
            return;
        };
        match self.engine.remove(id) {
            Ok(timeline) => self.message = format!("deleted \"{}\"", timeline.name),
            Err(err) => self.message = err.to_string(),
        }
        self.refresh_archive();
    }

    fn selected_timeline(&self) -> Option<TimelineId> {
        self.archive.get(self.archive_selected).map(|t| t.id)
    }

    fn move_selection(&mut self, delta: isize) {
        let (selected, len) = match self.focus {
            Pane::Library => (&mut self.library_selected, self.library_view.len()),
            Pane::Archive => (&mut self.archive_selected, self.archive.len()),
        };
        if len > 0 {
            *selected = selected.saturating_add_signed(delta).min(len - 1);
        }
    }

    fn cycle_genre(&mut self) {
        self.genre = match self.genre {
            None => Some(Genre::ALL[0]),
            Some(current) => Genre::ALL
                .iter()
                .position(|g| *g == current)
                .and_then(|i| Genre::ALL.get(i + 1))
                .copied(),
        };
        self.refilter();
    }

    fn refilter(&mut self) {
        self.library_view = self
            .engine
            .library()
            .search(&self.search, self.genre)
            .map(|(index, _)| index)
            .collect();
        self.library_selected = self
            .library_selected
            .min(self.library_view.len().saturating_sub(1));
    }

    fn refresh_archive(&mut self) {
        match self.engine.archived() {
            Ok(archive) => self.archive = archive,
            Err(err) => self.message = err.to_string(),
        }
        self.archive_selected = self.archive_selected.min(self.archive.len().saturating_sub(1));
    }

    fn view(&self) -> View<'_> {
        let library = self.engine.library();
        View {
            status: self.engine.recording_status(),
            elapsed_ms: self.engine.recording_elapsed(),
            playing: self.engine.active_playback(),
            held: self.engine.held_pitches(),
            key_range: self.keys.range(),
            library: self
                .library_view
                .iter()
                .filter_map(|&i| library.get(i))
                .collect(),
            library_selected: self.library_selected,
            search: &self.search,
            genre: self.genre,
            archive: &self.archive,
            archive_selected: self.archive_selected,
            focus: self.focus,
            scope: self.scope_rx.as_ref().map(|_| self.scope.as_slice()),
            message: &self.message,
            input: self.input.as_ref().map(|input| match input {
                Input::Rename { text, .. } => ("name", text.as_str()),
                Input::Compose { text } => ("vibe", text.as_str()),
                Input::Search => ("search", self.search.as_str()),
            }),
            tap_mode: self.taps.is_some(),
        }
    }
}
