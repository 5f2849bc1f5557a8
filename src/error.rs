//! Error types shared by the engine, the library store and the controller

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlayerError>;

#[derive(Error, Debug)]
pub enum PlayerError {
    /// Track id is not part of the engine queue or the library
    #[error("Track not found: {0}")]
    TrackNotFound(String),

    #[error("Playlist index {index} out of range ({count} playlists)")]
    PlaylistOutOfRange { index: usize, count: usize },

    #[error("Queue is empty")]
    EmptyQueue,

    #[error("Reached the end of the queue")]
    EndOfQueue,

    /// A UI affordance that exists but has no behaviour behind it
    #[error("Not implemented: {0}")]
    Unsupported(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}
