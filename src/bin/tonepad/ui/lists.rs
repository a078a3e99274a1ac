//! Library and archive panes

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use tonepad::engine::playback::PlaybackId;

use super::{Pane, View};

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let border = if focused { Color::Cyan } else { Color::DarkGray };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

fn play_marker(playing: bool) -> Span<'static> {
    if playing {
        Span::styled("■ ", Style::default().fg(Color::Green))
    } else {
        Span::styled("▷ ", Style::default().fg(Color::DarkGray))
    }
}

fn render_list(frame: &mut Frame, area: Rect, block: Block<'static>, items: Vec<ListItem>, selected: usize) {
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default().with_selected(Some(selected));
    frame.render_stateful_widget(list, area, &mut state);
}

pub fn render_library(frame: &mut Frame, area: Rect, view: &View) {
    let mut title = String::from(" Library ");
    if let Some(genre) = view.genre {
        title.push_str(&format!("[{genre}] "));
    }
    if !view.search.is_empty() {
        title.push_str(&format!("/{}/ ", view.search));
    }

    let items = view
        .library
        .iter()
        .map(|entry| {
            let playing = matches!(view.playing, Some(PlaybackId::Library(name)) if *name == entry.name);
            ListItem::new(Line::from(vec![
                play_marker(playing),
                Span::raw(entry.name.clone()),
                Span::styled(format!("  {}", entry.genre), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    render_list(
        frame,
        area,
        pane_block(title, view.focus == Pane::Library),
        items,
        view.library_selected,
    );
}

pub fn render_archive(frame: &mut Frame, area: Rect, view: &View) {
    let items = view
        .archive
        .iter()
        .map(|timeline| {
            let playing = view.playing == Some(&PlaybackId::Archived(timeline.id));
            let secs = timeline.duration_ms() as f32 / 1000.0;
            let mut spans = vec![
                play_marker(playing),
                Span::raw(timeline.name.clone()),
                Span::styled(format!("  {secs:.1}s"), Style::default().fg(Color::DarkGray)),
            ];
            if let Some(mood) = &timeline.annotation {
                spans.push(Span::styled(
                    format!("  {mood}"),
                    Style::default().fg(Color::Blue).add_modifier(Modifier::ITALIC),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = format!(" My Recordings ({}) ", view.archive.len());
    render_list(
        frame,
        area,
        pane_block(title, view.focus == Pane::Archive),
        items,
        view.archive_selected,
    );
}
