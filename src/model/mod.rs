//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (sections, repeat mode, help overlay, UI state)
//! - `playback`: Playback-related state (timing, settings, render snapshot)
//! - `library`: Tracks, playlists, voice aliases and the playlist store
//! - `adjacency`: Previous/next track lookup
//! - `visibility`: Panel progress to opacity mapping
//! - `app_model`: Main application model with state management methods

mod types;
mod playback;
mod library;
mod adjacency;
mod visibility;
mod app_model;

// Re-export all public types for convenient access
pub use types::{ActiveSection, RepeatState, UiState};

pub use playback::PlaybackInfo;

pub use library::{Library, LibraryData, Playlist, PlaylistStore, Track, VoiceAlias};

pub use adjacency::Adjacency;

pub use visibility::{fade_rgb, opacity_for_progress};

pub use app_model::AppModel;
