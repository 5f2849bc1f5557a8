//! Main application model with state management

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::engine::PlaybackState;
use crate::error::Result;
use super::adjacency::Adjacency;
use super::library::{Playlist, Track};
use super::playback::{PlaybackInfo, PlaybackSettings, PlaybackTiming};
use super::types::{ActiveSection, RepeatState, UiState};

const ERROR_DISPLAY_TIME: Duration = Duration::from_secs(5);

/// Main application model containing all state
pub struct AppModel {
    current_track: Arc<Mutex<Option<Track>>>,
    playback_state: Arc<Mutex<PlaybackState>>,
    playback_timing: Arc<Mutex<PlaybackTiming>>,
    playback_settings: Arc<Mutex<PlaybackSettings>>,
    pub ui_state: Arc<Mutex<UiState>>,
    pub should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new() -> Self {
        Self {
            current_track: Arc::new(Mutex::new(None)),
            playback_state: Arc::new(Mutex::new(PlaybackState::Idle)),
            playback_timing: Arc::new(Mutex::new(PlaybackTiming::default())),
            playback_settings: Arc::new(Mutex::new(PlaybackSettings::default())),
            ui_state: Arc::new(Mutex::new(UiState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    // ========================================================================
    // Engine & Playback State
    // ========================================================================

    pub async fn update_engine_name(&self, name: String) {
        self.playback_settings.lock().await.engine_name = name;
    }

    pub async fn update_track(&self, track: Track) {
        let duration_ms = track.duration_ms;
        *self.current_track.lock().await = Some(track);

        let mut timing = self.playback_timing.lock().await;
        timing.duration_ms = duration_ms;
        timing.position_ms = 0;
        timing.last_update = Instant::now();
    }

    pub async fn current_track_id(&self) -> Option<String> {
        self.current_track.lock().await.as_ref().map(|t| t.id.clone())
    }

    pub async fn update_playback_state(&self, state: PlaybackState) {
        *self.playback_state.lock().await = state;
        self.playback_timing
            .lock()
            .await
            .set_playing(state == PlaybackState::Playing);
    }

    pub async fn update_playback_position(&self, position_ms: u32, duration_ms: u32) {
        let is_playing = self.is_playing().await;
        let mut timing = self.playback_timing.lock().await;
        timing.duration_ms = duration_ms;
        timing.update_position(position_ms, is_playing);
    }

    pub async fn update_modes(&self, shuffle: bool, repeat: RepeatState) {
        let mut settings = self.playback_settings.lock().await;
        settings.shuffle = shuffle;
        settings.repeat = repeat;
    }

    pub async fn get_playback_info(&self) -> PlaybackInfo {
        let track = self.current_track.lock().await.clone();
        let state = *self.playback_state.lock().await;
        let timing = self.playback_timing.lock().await;
        let settings = self.playback_settings.lock().await.clone();

        PlaybackInfo {
            track,
            state,
            progress_ms: timing.current_position_ms(),
            duration_ms: timing.duration_ms,
            settings,
        }
    }

    pub async fn is_playing(&self) -> bool {
        *self.playback_state.lock().await == PlaybackState::Playing
    }

    pub async fn get_shuffle_state(&self) -> bool {
        self.playback_settings.lock().await.shuffle
    }

    pub async fn get_repeat_state(&self) -> RepeatState {
        self.playback_settings.lock().await.repeat
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    // ========================================================================
    // Library & Adjacency
    // ========================================================================

    /// Refresh the sidebar after the store changed
    pub async fn set_playlists(&self, playlists: Vec<Playlist>, active: usize) {
        let mut state = self.ui_state.lock().await;
        if state.playlist_selected >= playlists.len() {
            state.playlist_selected = playlists.len().saturating_sub(1);
        }
        state.playlists = playlists;
        state.active_playlist = active;
    }

    pub async fn set_track_list(&self, tracks: Vec<Track>) {
        let mut state = self.ui_state.lock().await;
        if state.track_selected >= tracks.len() {
            state.track_selected = tracks.len().saturating_sub(1);
        }
        state.tracks = tracks;
    }

    pub async fn set_adjacency(&self, adjacency: Adjacency) {
        self.ui_state.lock().await.adjacency = adjacency;
    }

    pub async fn get_adjacency(&self) -> Adjacency {
        self.ui_state.lock().await.adjacency.clone()
    }

    pub async fn get_selected_playlist(&self) -> Option<usize> {
        let state = self.ui_state.lock().await;
        (state.playlist_selected < state.playlists.len()).then_some(state.playlist_selected)
    }

    /// Track under the cursor together with the playlist it is listed in
    pub async fn get_selected_track(&self) -> Option<(String, usize)> {
        let state = self.ui_state.lock().await;
        state
            .tracks
            .get(state.track_selected)
            .map(|t| (t.id.clone(), state.playlist_selected))
    }

    // ========================================================================
    // Now-playing panel
    // ========================================================================

    pub async fn set_panel_progress(&self, progress: f32) {
        self.ui_state.lock().await.panel_progress = progress;
    }

    pub async fn set_next_prev_opacity(&self, opacity: f32) {
        self.ui_state.lock().await.next_prev_opacity = opacity;
    }

    // ========================================================================
    // UI State
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn cycle_section_forward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.next();
    }

    pub async fn cycle_section_backward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.prev();
    }

    pub async fn set_active_section(&self, section: ActiveSection) {
        self.ui_state.lock().await.active_section = section;
    }

    /// Move the cursor; returns true when the playlist selection changed
    pub async fn move_selection_up(&self) -> bool {
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Playlists if state.playlist_selected > 0 => {
                state.playlist_selected -= 1;
                state.track_selected = 0;
                true
            }
            ActiveSection::Tracks if state.track_selected > 0 => {
                state.track_selected -= 1;
                false
            }
            _ => false,
        }
    }

    pub async fn move_selection_down(&self) -> bool {
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Playlists if state.playlist_selected + 1 < state.playlists.len() => {
                state.playlist_selected += 1;
                state.track_selected = 0;
                true
            }
            ActiveSection::Tracks if state.track_selected + 1 < state.tracks.len() => {
                state.track_selected += 1;
                false
            }
            _ => false,
        }
    }

    // ========================================================================
    // Voice prompt
    // ========================================================================

    pub async fn append_to_voice_input(&self, c: char) {
        self.ui_state.lock().await.voice_input.push(c);
    }

    pub async fn backspace_voice_input(&self) {
        self.ui_state.lock().await.voice_input.pop();
    }

    pub async fn clear_voice_input(&self) {
        self.ui_state.lock().await.voice_input.clear();
    }

    pub async fn take_voice_input(&self) -> String {
        std::mem::take(&mut self.ui_state.lock().await.voice_input)
    }

    pub async fn set_last_voice_command(&self, command: String) {
        self.ui_state.lock().await.last_voice_command = Some(command);
    }

    // ========================================================================
    // Help overlay
    // ========================================================================

    pub async fn show_help(&self) {
        self.ui_state.lock().await.help.show();
    }

    /// OK action on the help panel
    pub async fn confirm_help(&self) {
        self.ui_state.lock().await.help.confirm();
    }

    pub async fn request_help_close(&self) -> Result<()> {
        self.ui_state.lock().await.help.request_close()
    }

    pub async fn is_help_open(&self) -> bool {
        self.ui_state.lock().await.help.is_visible()
    }

    // ========================================================================
    // Error Handling
    // ========================================================================

    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    pub async fn has_error(&self) -> bool {
        self.ui_state.lock().await.error_message.is_some()
    }

    pub async fn auto_clear_old_errors(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.error_timestamp {
            if timestamp.elapsed() >= ERROR_DISPLAY_TIME {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
    }
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new()
    }
}
