//! TUI rendering for tonepad
//!
//! Everything drawn comes from a [`View`] snapshot; rendering never touches
//! the engine.

mod keyboard;
mod lists;
mod transport;
mod waveform;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use tonepad::{
    engine::{playback::PlaybackId, session::RecordingStatus},
    library::{Genre, ToneEntry},
    timeline::{Pitch, Timeline},
};

use keyboard::render_keyboard;
use lists::{render_archive, render_library};
use transport::{render_transport, AudioStats};
use waveform::render_waveform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Library,
    Archive,
}

pub struct View<'a> {
    pub status: RecordingStatus,
    pub elapsed_ms: Option<u64>,
    pub playing: Option<&'a PlaybackId>,
    pub held: Vec<Pitch>,
    pub key_range: (Pitch, Pitch),
    pub library: Vec<&'a ToneEntry>,
    pub library_selected: usize,
    pub search: &'a str,
    pub genre: Option<Genre>,
    pub archive: &'a [Timeline],
    pub archive_selected: usize,
    pub focus: Pane,
    /// `None` when running without audio.
    pub scope: Option<&'a [f32]>,
    pub message: &'a str,
    /// Prompt and text of an open text field.
    pub input: Option<(&'static str, &'a str)>,
    pub tap_mode: bool,
}

pub fn render(frame: &mut Frame, view: &View) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Transport bar
            Constraint::Length(6), // Keyboard
            Constraint::Min(6),    // Library | archive
            Constraint::Length(8), // Waveform
            Constraint::Length(1), // Message / text field
            Constraint::Length(1), // Help bar
        ])
        .split(frame.area());

    let stats = AudioStats::from_buffer(view.scope.unwrap_or(&[]));
    render_transport(frame, chunks[0], view, &stats);
    render_keyboard(frame, chunks[1], view);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    render_library(frame, panes[0], view);
    render_archive(frame, panes[1], view);

    render_waveform(frame, chunks[3], view.scope);

    let status_line = match view.input {
        Some((prompt, text)) => Line::from(vec![
            Span::styled(format!(" {prompt}: "), Style::default().fg(Color::Yellow)),
            Span::raw(text),
            Span::styled("█", Style::default().fg(Color::Yellow)),
        ]),
        None => Line::from(Span::styled(
            format!(" {}", view.message),
            Style::default().fg(Color::White),
        )),
    };
    frame.render_widget(Paragraph::new(status_line), chunks[4]);

    let help = Paragraph::new(
        " [F1] Rec/Save  [F2] Pause  [Enter] Play/Stop  [F3] Name  [F4] Compose  [F5] Rename  \
         [F6] Search  [F7] Genre  [Del] Delete  [Tab] Pane  [←→] Octave  [Esc] Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[5]);
}
