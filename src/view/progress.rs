//! Now-playing panel and progress bar rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::engine::PlaybackState;
use crate::model::{PlaybackInfo, RepeatState, UiState};
use super::next_prev::render_next_prev;
use super::utils::format_duration;

/// Rows of the panel when fully expanded, borders included
pub const PANEL_MAX_HEIGHT: u16 = 8;

/// Panel height for a progress in `[0, 100]`
pub fn panel_height(progress: f32) -> u16 {
    let ratio = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 100.0) / 100.0 };
    (ratio * PANEL_MAX_HEIGHT as f32).round() as u16
}

pub fn render_now_playing_panel(frame: &mut Frame, area: Rect, playback: &PlaybackInfo, ui_state: &UiState) {
    // Too small to hold borders and a line of text
    if area.height < 3 {
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Now Playing (e to collapse) ")
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    let lines = match &playback.track {
        Some(track) => vec![
            Line::from(Span::styled(
                track.title.clone(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("{} · {}", track.artist, track.album),
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                state_label(playback.state),
                Style::default().fg(Color::Yellow),
            )),
        ],
        None => vec![Line::from(Span::styled(
            "Nothing queued",
            Style::default().fg(Color::DarkGray),
        ))],
    };
    frame.render_widget(Paragraph::new(lines), chunks[0]);

    render_next_prev(frame, chunks[1], &ui_state.adjacency, ui_state.next_prev_opacity);
}

fn state_label(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Idle => "Idle",
        PlaybackState::Loading => "Loading…",
        PlaybackState::Ready => "Ready",
        PlaybackState::Playing => "Playing",
        PlaybackState::Paused => "Paused",
        PlaybackState::Stopped => "Stopped",
    }
}

pub fn render_progress_bar(frame: &mut Frame, area: Rect, playback: &PlaybackInfo) {
    let status_text = match &playback.track {
        None => " No track playing".to_string(),
        Some(track) if playback.is_playing() => {
            format!(" ▶ {} | {} ({})", track.title, track.artist, track.album)
        }
        Some(track) => format!("⏸  {} | {} ({})", track.title, track.artist, track.album),
    };

    let shuffle_text = if playback.settings.shuffle { "Shuffle: On" } else { "Shuffle: Off" };
    let repeat_text = match playback.settings.repeat {
        RepeatState::Off => "Repeat: Off",
        RepeatState::All => "Repeat: All",
        RepeatState::One => "Repeat: One",
    };

    let time_str = format!(
        "{} / {}",
        format_duration(playback.progress_ms),
        format_duration(playback.duration_ms)
    );

    let progress_ratio = if playback.duration_ms > 0 {
        (playback.progress_ms as f64 / playback.duration_ms as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let title = format!("{} ", status_text);
    let controls_info = format!(" {} | {} | h: help ", shuffle_text, repeat_text);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_bottom(Line::from(controls_info).right_aligned()),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(progress_ratio)
        .label(time_str);

    frame.render_widget(gauge, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_height_follows_progress() {
        assert_eq!(panel_height(0.0), 0);
        assert_eq!(panel_height(50.0), PANEL_MAX_HEIGHT / 2);
        assert_eq!(panel_height(100.0), PANEL_MAX_HEIGHT);
        assert_eq!(panel_height(f32::NAN), 0);
    }
}
