//! Layout rendering (top bar, sidebar)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{ActiveSection, UiState};

pub fn render_top_bar(frame: &mut Frame, area: Rect, ui_state: &UiState, engine_name: &str) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),        // Voice prompt
            Constraint::Length(30),    // Last command
            Constraint::Length(20),    // Engine name
        ])
        .split(area);

    let is_focused = ui_state.active_section == ActiveSection::VoicePrompt;
    let prompt_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };

    let prompt_text = if ui_state.voice_input.is_empty() {
        "Say something... (v to speak, try \"open Precious\")"
    } else {
        &ui_state.voice_input
    };

    let prompt = Paragraph::new(prompt_text)
        .style(prompt_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Voice ")
                .padding(Padding::horizontal(1))
                .border_style(if is_focused {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                }),
        );
    frame.render_widget(prompt, chunks[0]);

    let heard = Paragraph::new(ui_state.last_voice_command.as_deref().unwrap_or("-"))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(" Heard "));
    frame.render_widget(heard, chunks[1]);

    let engine = Paragraph::new(format!("🎵 {}", engine_name))
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Engine "));
    frame.render_widget(engine, chunks[2]);
}

pub fn render_sidebar(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let is_focused = ui_state.active_section == ActiveSection::Playlists;

    let playlist_items: Vec<ListItem> = ui_state
        .playlists
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if i == ui_state.playlist_selected && is_focused {
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else if i == ui_state.playlist_selected {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            // Mark the playlist loaded into the engine
            let marker = if i == ui_state.active_playlist { "● " } else { "  " };
            ListItem::new(format!("{}{}", marker, item.name)).style(style)
        })
        .collect();

    let playlists = List::new(playlist_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Playlists ")
                .padding(Padding::horizontal(1))
                .border_style(if is_focused {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                }),
        )
        .highlight_style(Style::default()); // Highlight handled by item styles

    let mut list_state = ListState::default();
    list_state.select(Some(ui_state.playlist_selected));

    frame.render_stateful_widget(playlists, area, &mut list_state);
}
