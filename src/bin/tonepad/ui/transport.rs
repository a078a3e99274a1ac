//! Transport bar widget - shows recording state, elapsed time, playback and audio stats

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use tonepad::engine::session::RecordingStatus;

use super::View;

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    /// Compute audio stats from a buffer
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

/// `mm:ss` of a millisecond count.
fn clock_face(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

pub fn render_transport(frame: &mut Frame, area: Rect, view: &View, stats: &AudioStats) {
    let block = Block::default().title(" tonepad ").borders(Borders::ALL);

    let (symbol, label, color) = match view.status {
        RecordingStatus::Idle => ("○", "Idle", Color::DarkGray),
        RecordingStatus::Active => ("●", "REC", Color::Red),
        RecordingStatus::Paused => ("⏸", "Paused", Color::Yellow),
    };
    let elapsed = view.elapsed_ms.map_or_else(|| "--:--".to_owned(), clock_face);

    let playing = match view.playing {
        Some(id) => format!("▶ {id}"),
        None => "■ stopped".to_owned(),
    };

    let mut spans = vec![
        Span::styled(
            format!(" {symbol} {label} {elapsed}  "),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("{playing}  "), Style::default().fg(Color::Green)),
    ];
    if view.scope.is_some() {
        spans.push(Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", stats.peak, stats.rms),
            Style::default().fg(Color::Magenta),
        ));
    } else {
        spans.push(Span::styled("silent", Style::default().fg(Color::DarkGray)));
    }
    if view.tap_mode {
        spans.push(Span::styled("  tap mode", Style::default().fg(Color::DarkGray)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
