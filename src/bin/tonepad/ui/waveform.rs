//! Waveform oscilloscope widget

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

/// The synth's gain keeps a few overlapping notes well inside this.
const Y_RANGE: f64 = 0.5;

pub fn render_waveform(frame: &mut Frame, area: Rect, scope: Option<&[f32]>) {
    let block = Block::default().title(" Waveform ").borders(Borders::ALL);

    let Some(samples) = scope else {
        let note = Paragraph::new(" no audio output (--silent)")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(note, area);
        return;
    };

    let data: Vec<(f64, f64)> = samples
        .iter()
        .enumerate()
        .map(|(i, &sample)| (i as f64 / samples.len() as f64, sample as f64))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-Y_RANGE, Y_RANGE])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
