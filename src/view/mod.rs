//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared formatting helpers
//! - `layout`: Main layout structure (voice prompt bar, playlists sidebar)
//! - `content`: Track list of the selected playlist
//! - `progress`: Now-playing panel and progress bar
//! - `next_prev`: Previous/next widget that fades in with the panel
//! - `overlays`: Modal overlays (error, voice help)

mod utils;
mod layout;
mod content;
mod progress;
mod next_prev;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{PlaybackInfo, UiState};

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, playback: &PlaybackInfo, ui_state: &UiState) {
        let panel_height = progress::panel_height(ui_state.panel_progress);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),            // Voice prompt + engine
                Constraint::Min(0),               // Main content (sidebar + tracks)
                Constraint::Length(panel_height), // Now-playing panel
                Constraint::Length(3),            // Progress bar with playback info
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], ui_state, &playback.settings.engine_name);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30), // Playlists
                Constraint::Percentage(70), // Tracks
            ])
            .split(chunks[1]);

        layout::render_sidebar(frame, main_chunks[0], ui_state);

        let current_track_id = playback.track.as_ref().map(|t| t.id.as_str());
        content::render_track_list(frame, main_chunks[1], ui_state, current_track_id);

        progress::render_now_playing_panel(frame, chunks[2], playback, ui_state);
        progress::render_progress_bar(frame, chunks[3], playback);

        if ui_state.help.is_visible() {
            overlays::render_help_popup(frame);
        }

        // Errors sit above every other overlay, help included
        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, ui_state);
        }
    }
}
