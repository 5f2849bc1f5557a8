//! Playback-related types and state management

use std::time::Instant;

use crate::engine::PlaybackState;
use super::library::Track;
use super::types::RepeatState;

/// Internal timing state for smooth progress bar updates
#[derive(Clone)]
pub struct PlaybackTiming {
    pub position_ms: u32,
    pub last_update: Instant,
    pub is_playing: bool,
    pub duration_ms: u32,
}

impl Default for PlaybackTiming {
    fn default() -> Self {
        Self {
            position_ms: 0,
            last_update: Instant::now(),
            is_playing: false,
            duration_ms: 0,
        }
    }
}

impl PlaybackTiming {
    pub fn current_position_ms(&self) -> u32 {
        if self.is_playing && self.duration_ms > 0 {
            let elapsed = self.last_update.elapsed().as_millis() as u32;
            self.position_ms.saturating_add(elapsed).min(self.duration_ms)
        } else {
            self.position_ms.min(self.duration_ms.max(1) - 1)
        }
    }

    pub fn update_position(&mut self, new_position_ms: u32, is_playing: bool) {
        let current_calculated = self.current_position_ms();
        let diff = new_position_ms as i64 - current_calculated as i64;

        let state_changed = self.is_playing != is_playing;
        let significant_jump = diff.abs() > 2000;
        let was_paused = !self.is_playing;
        let acceptable_sync = diff >= -100;

        if state_changed || significant_jump || was_paused || acceptable_sync {
            self.position_ms = new_position_ms;
            self.last_update = Instant::now();
        }
        self.is_playing = is_playing;
    }

    /// Stop or start the clock without moving the position
    pub fn set_playing(&mut self, is_playing: bool) {
        self.position_ms = self.current_position_ms();
        self.is_playing = is_playing;
        self.last_update = Instant::now();
    }
}

/// Settings related to playback (engine, shuffle, repeat)
#[derive(Clone, Debug)]
pub struct PlaybackSettings {
    pub engine_name: String,
    pub shuffle: bool,
    pub repeat: RepeatState,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            engine_name: "voice-player".to_string(),
            shuffle: false,
            repeat: RepeatState::Off,
        }
    }
}

/// Complete playback information for rendering the UI
#[derive(Clone, Debug, Default)]
pub struct PlaybackInfo {
    pub track: Option<Track>,
    pub state: PlaybackState,
    pub progress_ms: u32,
    pub duration_ms: u32,
    pub settings: PlaybackSettings,
}

impl PlaybackInfo {
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }
}
