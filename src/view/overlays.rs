//! Overlay rendering (error notification, voice help popup)

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::model::UiState;

/// Voice commands and their Vietnamese descriptions
pub const VOICE_HELP: &[(&str, &str)] = &[
    ("Open + track name", "Phát bài hát"),
    ("Next", "Chuyển sang bài hát tiếp theo"),
    ("Previous", "Quay về bài hát phía trước"),
    ("Play", "Tiếp tục phát"),
    ("Replay", "Phát lại từ đầu"),
    ("Pause", "Tạm dừng"),
    ("Enable shuffle", "Bật phát ngẫu nhiên"),
    ("Disable shuffle", "Tắt phát ngẫu nhiên"),
    ("Enable repeat", "Bật chế độ lặp lại"),
    ("Disable repeat", "Tắt chế độ lặp lại"),
];

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

pub fn render_error_notification(frame: &mut Frame, ui_state: &UiState) {
    if let Some(ref error_msg) = ui_state.error_message {
        let area = frame.area();

        let popup_width = 52.min(area.width.saturating_sub(4));
        let inner_width = popup_width.saturating_sub(4).max(1) as usize;

        let error_line_count = ((error_msg.chars().count() as f32) / (inner_width as f32)).ceil() as u16;

        // Height: top border (1) + error lines + bottom border (1)
        let popup_height = (2 + error_line_count.max(1)).min(area.height.saturating_sub(4));
        let popup_area = centered(area, popup_width, popup_height);

        frame.render_widget(Clear, popup_area);

        let error_widget = Paragraph::new(error_msg.to_string())
            .style(Style::default().fg(Color::Red))
            .wrap(ratatui::widgets::Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red))
                    .title(" Error (Esc to dismiss) ")
                    .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
                    .style(Style::default().bg(Color::Black)),
            );

        frame.render_widget(error_widget, popup_area);
    }
}

pub fn render_help_popup(frame: &mut Frame) {
    let area = frame.area();

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            "── Voice commands ──",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        Line::raw(""),
    ];
    lines.extend(VOICE_HELP.iter().map(|(command, description)| {
        Line::from(vec![
            Span::styled(
                format!("{:>18}", command),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(description.to_string(), Style::default().fg(Color::White)),
        ])
    }));
    lines.push(Line::raw(""));
    lines.push(
        Line::from(Span::styled(
            "[ OK ]",
            Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
    );

    let popup_height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let popup_area = centered(area, 62, popup_height);

    frame.render_widget(Clear, popup_area);

    let help_text = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help (Enter for OK) ")
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        )
        .style(Style::default().bg(Color::Black));

    frame.render_widget(help_text, popup_area);
}
