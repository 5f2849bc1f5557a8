//! Track list of the selected playlist

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph},
    Frame,
};

use crate::model::{ActiveSection, UiState};
use super::utils::{calculate_track_column_widths, format_duration, truncate_string};

pub fn render_track_list(frame: &mut Frame, area: Rect, ui_state: &UiState, current_track_id: Option<&str>) {
    let is_focused = ui_state.active_section == ActiveSection::Tracks;
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    let title = match ui_state.playlists.get(ui_state.playlist_selected) {
        Some(playlist) => format!(" {} ", playlist.name),
        None => " Tracks ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding::horizontal(1))
        .border_style(border_style);

    if ui_state.tracks.is_empty() {
        let empty = Paragraph::new("This playlist is empty")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let content_width = area.width.saturating_sub(4) as usize;
    let (num_width, title_width, artist_width, duration_width) =
        calculate_track_column_widths(content_width, ui_state.tracks.len());

    let header = ListItem::new(Line::from(Span::styled(
        format!(
            " {:>num$}   {}   {}   {:>dur$}",
            "#",
            truncate_string("Title", title_width),
            truncate_string("Artist", artist_width),
            "Time",
            num = num_width,
            dur = duration_width,
        ),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
    )));

    let rows = ui_state.tracks.iter().enumerate().map(|(i, track)| {
        let is_selected = i == ui_state.track_selected;
        let is_current = current_track_id == Some(track.id.as_str());

        let style = if is_selected && is_focused {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else if is_current {
            Style::default().fg(Color::Cyan)
        } else if is_selected {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let marker = if is_current { "▶".to_string() } else { (i + 1).to_string() };
        ListItem::new(format!(
            " {:>num$}   {}   {}   {:>dur$}",
            marker,
            truncate_string(&track.title, title_width),
            truncate_string(&track.artist, artist_width),
            format_duration(track.duration_ms),
            num = num_width,
            dur = duration_width,
        ))
        .style(style)
    });

    let items: Vec<ListItem> = std::iter::once(header).chain(rows).collect();
    let list = List::new(items).block(block).highlight_style(Style::default());

    let mut list_state = ListState::default();
    list_state.select(Some(ui_state.track_selected + 1)); // +1 for header

    frame.render_stateful_widget(list, area, &mut list_state);
}
