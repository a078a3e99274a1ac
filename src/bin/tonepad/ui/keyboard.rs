//! Piano strip widget - the playable range, held keys lit

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use tonepad::timeline::Pitch;

use super::View;

const KEY_WIDTH: usize = 3;

pub fn render_keyboard(frame: &mut Frame, area: Rect, view: &View) {
    let block = Block::default().title(" Keys ").borders(Borders::ALL);
    let (low, high) = view.key_range;

    let lit = Style::default().fg(Color::Yellow);
    let idle = Style::default().fg(Color::Gray);
    let cell = |pitch: Pitch, on_row: bool| -> Span<'static> {
        if !on_row {
            return Span::raw(" ".repeat(KEY_WIDTH));
        }
        if view.held.contains(&pitch) {
            Span::styled(" █ ", lit)
        } else {
            Span::styled(" ▒ ", idle)
        }
    };

    let pitches: Vec<Pitch> = (low.midi()..=high.midi()).map(Pitch).collect();
    let sharps = Line::from(
        pitches
            .iter()
            .map(|&p| cell(p, p.is_sharp()))
            .collect::<Vec<_>>(),
    );
    let naturals = Line::from(
        pitches
            .iter()
            .map(|&p| cell(p, !p.is_sharp()))
            .collect::<Vec<_>>(),
    );
    let labels = Line::from(
        pitches
            .iter()
            .map(|&p| {
                let label = if p.class_name() == "C" {
                    format!("{:<width$}", p.to_string(), width = KEY_WIDTH)
                } else {
                    " ".repeat(KEY_WIDTH)
                };
                Span::styled(label, Style::default().fg(Color::DarkGray))
            })
            .collect::<Vec<_>>(),
    );

    frame.render_widget(
        Paragraph::new(vec![sharps, naturals, labels]).block(block),
        area,
    );
}
