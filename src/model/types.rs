//! Core type definitions for the application

use std::time::Instant;

use crate::error::{PlayerError, Result};
use super::adjacency::Adjacency;
use super::library::{Playlist, Track};

/// Which section of the UI is currently active/focused
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveSection {
    VoicePrompt,
    Playlists,
    Tracks,
}

impl ActiveSection {
    pub fn next(self) -> Self {
        match self {
            ActiveSection::VoicePrompt => ActiveSection::Playlists,
            ActiveSection::Playlists => ActiveSection::Tracks,
            ActiveSection::Tracks => ActiveSection::VoicePrompt,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ActiveSection::VoicePrompt => ActiveSection::Tracks,
            ActiveSection::Playlists => ActiveSection::VoicePrompt,
            ActiveSection::Tracks => ActiveSection::Playlists,
        }
    }
}

/// Repeat mode state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RepeatState {
    #[default]
    Off,
    All,
    One,
}

impl RepeatState {
    pub fn cycle(self) -> Self {
        match self {
            RepeatState::Off => RepeatState::All,
            RepeatState::All => RepeatState::One,
            RepeatState::One => RepeatState::Off,
        }
    }
}

/// Voice help panel. Opened by the help command, closed with its OK action.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HelpOverlay {
    visible: bool,
}

impl HelpOverlay {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    /// The OK action
    pub fn confirm(&mut self) {
        self.visible = false;
    }

    /// Closing by tapping outside the panel has no behaviour yet
    pub fn request_close(&self) -> Result<()> {
        Err(PlayerError::Unsupported("closing the help panel from outside; press Enter for OK"))
    }
}

/// UI state for the application
#[derive(Clone)]
pub struct UiState {
    pub active_section: ActiveSection,
    pub voice_input: String,
    pub playlists: Vec<Playlist>,
    pub active_playlist: usize,
    pub playlist_selected: usize,
    pub tracks: Vec<Track>,
    pub track_selected: usize,
    pub adjacency: Adjacency,
    pub panel_progress: f32,
    pub next_prev_opacity: f32,
    pub last_voice_command: Option<String>,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub help: HelpOverlay,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_section: ActiveSection::Playlists,
            voice_input: String::new(),
            playlists: vec![], // Filled from the library store
            active_playlist: 0,
            playlist_selected: 0,
            tracks: vec![],
            track_selected: 0,
            adjacency: Adjacency::default(),
            panel_progress: 0.0,
            next_prev_opacity: 0.0,
            last_voice_command: None,
            error_message: None,
            error_timestamp: None,
            help: HelpOverlay::default(),
        }
    }
}
