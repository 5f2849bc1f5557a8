//! Previous/next track widget inside the now-playing panel

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::model::{fade_rgb, Adjacency, Track};
use super::utils::truncate_string;

const LABEL_RGB: (u8, u8, u8) = (128, 128, 128);
const TITLE_RGB: (u8, u8, u8) = (255, 255, 255);
const ACCENT_RGB: (u8, u8, u8) = (30, 215, 96);

fn faded(rgb: (u8, u8, u8), opacity: f32) -> Color {
    let (r, g, b) = fade_rgb(rgb, opacity);
    Color::Rgb(r, g, b)
}

/// Render nothing while fully transparent so the widget takes no input focus
pub fn render_next_prev(frame: &mut Frame, area: Rect, adjacency: &Adjacency, opacity: f32) {
    if opacity <= 0.0 || adjacency.is_empty() {
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let half = chunks[0].width.saturating_sub(4) as usize;
    if let Some(track) = &adjacency.previous {
        let line = side_line("◀ Previous", track, half, opacity);
        frame.render_widget(Paragraph::new(line), chunks[0]);
    }
    if let Some(track) = &adjacency.next {
        let line = side_line("Next ▶", track, half, opacity).right_aligned();
        frame.render_widget(Paragraph::new(line), chunks[1]);
    }
}

fn side_line(label: &str, track: &Track, width: usize, opacity: f32) -> Line<'static> {
    let title_width = width.saturating_sub(label.chars().count() + 1);
    Line::from(vec![
        Span::styled(
            format!("{} ", label),
            Style::default().fg(faded(ACCENT_RGB, opacity)).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            truncate_string(&track.title, title_width).trim_end().to_string(),
            Style::default().fg(faded(TITLE_RGB, opacity)),
        ),
        Span::styled(
            format!(" · {}", track.artist),
            Style::default().fg(faded(LABEL_RGB, opacity)),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::testing::track;

    fn rendered(adjacency: &Adjacency, opacity: f32) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 1)).unwrap();
        terminal
            .draw(|f| render_next_prev(f, f.area(), adjacency, opacity))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn both_sides() -> Adjacency {
        Adjacency { previous: Some(track("1")), next: Some(track("3")) }
    }

    #[test]
    fn test_hidden_when_transparent() {
        assert!(rendered(&both_sides(), 0.0).trim().is_empty());
    }

    #[test]
    fn test_shows_both_neighbours_when_visible() {
        let text = rendered(&both_sides(), 1.0);
        assert!(text.contains("Previous"));
        assert!(text.contains("Next"));
    }

    #[test]
    fn test_missing_side_is_blank() {
        let text = rendered(&Adjacency { previous: None, next: Some(track("3")) }, 1.0);
        assert!(!text.contains("Previous"));
        assert!(text.contains("Next"));
    }

    #[test]
    fn test_colours_scale_with_opacity() {
        assert_eq!(faded(ACCENT_RGB, 0.5), Color::Rgb(15, 108, 48));
    }
}
