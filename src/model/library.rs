//! Track and playlist store, including the voice alias table used by "open"

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::engine::PlaybackEngine;
use crate::error::{PlayerError, Result};

/// A playable track. Immutable once loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub duration_ms: u32,
}

/// An ordered list of track ids
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    #[serde(default)]
    pub items: Vec<String>,
}

/// Maps a spoken track name to the track and playlist it opens
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceAlias {
    pub name: String,
    pub track_id: String,
    #[serde(default)]
    pub playlist: usize,
}

/// On-disk library layout
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LibraryData {
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub playlists: Vec<Playlist>,
    #[serde(default)]
    pub voice_aliases: Vec<VoiceAlias>,
}

impl LibraryData {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let data: LibraryData = toml::from_str(content)?;
        data.validate()?;
        Ok(data)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let data = Self::from_toml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            tracks = data.tracks.len(),
            playlists = data.playlists.len(),
            aliases = data.voice_aliases.len(),
            "Library loaded"
        );
        Ok(data)
    }

    /// Library used when no library file is configured
    pub fn demo() -> Self {
        let track = |id: &str, title: &str, artist: &str, duration_ms: u32| Track {
            id: id.to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
            album: "Demo Sessions".to_string(),
            duration_ms,
        };

        Self {
            tracks: vec![
                track("1", "Precious", "Unknown Artist", 214_000),
                track("2", "Forget Me Now", "Unknown Artist", 198_000),
                track("3", "Paper Boats", "Unknown Artist", 231_000),
                track("4", "Midnight Drive", "Unknown Artist", 245_000),
                track("5", "Low Tide", "Unknown Artist", 187_000),
            ],
            playlists: vec![
                Playlist {
                    name: "Favorites".to_string(),
                    items: vec!["1".into(), "2".into(), "3".into(), "4".into()],
                },
                Playlist {
                    name: "Late Night".to_string(),
                    items: vec!["5".into(), "4".into(), "2".into()],
                },
            ],
            voice_aliases: vec![
                VoiceAlias { name: "Precious".to_string(), track_id: "1".to_string(), playlist: 0 },
                VoiceAlias { name: "Forget Me Now".to_string(), track_id: "2".to_string(), playlist: 0 },
            ],
        }
    }

    fn validate(&self) -> Result<()> {
        for alias in &self.voice_aliases {
            let Some(playlist) = self.playlists.get(alias.playlist) else {
                return Err(PlayerError::Config(format!(
                    "voice alias '{}' points at playlist {} but only {} exist",
                    alias.name,
                    alias.playlist,
                    self.playlists.len()
                )));
            };
            if !playlist.items.contains(&alias.track_id) {
                return Err(PlayerError::Config(format!(
                    "voice alias '{}' points at track '{}' which is not in playlist '{}'",
                    alias.name, alias.track_id, playlist.name
                )));
            }
        }

        for playlist in &self.playlists {
            for id in &playlist.items {
                if !self.tracks.iter().any(|t| &t.id == id) {
                    tracing::warn!(playlist = %playlist.name, track_id = %id, "Playlist references unknown track");
                }
            }
        }
        Ok(())
    }

    pub fn find_track(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Resolved tracks of one playlist, skipping ids without metadata
    pub fn playlist_tracks(&self, index: usize) -> Vec<Track> {
        self.playlists
            .get(index)
            .map(|p| p.items.iter().filter_map(|id| self.find_track(id).cloned()).collect())
            .unwrap_or_default()
    }
}

/// Source of playlists and track metadata for the player screen
#[async_trait]
pub trait PlaylistStore: Send + Sync {
    /// Index of the active playlist
    async fn active(&self) -> usize;

    async fn lists(&self) -> Vec<Playlist>;

    async fn tracks(&self) -> Vec<Track>;

    /// Make `index` the active playlist. Returns once the engine queue holds its tracks.
    async fn switch_active(&self, index: usize) -> Result<()>;

    /// Look up the track a spoken name should open
    async fn resolve_alias(&self, name: &str) -> Option<VoiceAlias>;
}

/// Store backed by a [`LibraryData`] that keeps the engine queue in step with the active playlist
pub struct Library {
    data: RwLock<LibraryData>,
    active: RwLock<usize>,
    engine: Arc<dyn PlaybackEngine>,
}

impl Library {
    pub fn new(data: LibraryData, engine: Arc<dyn PlaybackEngine>) -> Self {
        Self {
            data: RwLock::new(data),
            active: RwLock::new(0),
            engine,
        }
    }

    /// Queue the first playlist so the engine has something to play
    pub async fn activate_initial(&self) -> Result<()> {
        if self.data.read().await.playlists.is_empty() {
            tracing::warn!("Library has no playlists, nothing to queue");
            return Ok(());
        }
        self.switch_active(0).await
    }

    /// Swap in new library contents and requeue the active playlist
    pub async fn replace(&self, data: LibraryData) -> Result<()> {
        let count = data.playlists.len();
        *self.data.write().await = data;

        let active = {
            let mut active = self.active.write().await;
            if *active >= count {
                *active = 0;
            }
            *active
        };

        if count > 0 {
            self.switch_active(active).await?;
        } else {
            tracing::warn!("Reloaded library has no playlists, clearing the queue");
            self.engine.load_queue(Vec::new()).await?;
        }
        Ok(())
    }

    pub async fn playlist_tracks(&self, index: usize) -> Vec<Track> {
        self.data.read().await.playlist_tracks(index)
    }
}

#[async_trait]
impl PlaylistStore for Library {
    async fn active(&self) -> usize {
        *self.active.read().await
    }

    async fn lists(&self) -> Vec<Playlist> {
        self.data.read().await.playlists.clone()
    }

    async fn tracks(&self) -> Vec<Track> {
        self.data.read().await.tracks.clone()
    }

    async fn switch_active(&self, index: usize) -> Result<()> {
        let queue = {
            let data = self.data.read().await;
            if index >= data.playlists.len() {
                return Err(PlayerError::PlaylistOutOfRange {
                    index,
                    count: data.playlists.len(),
                });
            }
            data.playlist_tracks(index)
        };

        tracing::debug!(playlist = index, tracks = queue.len(), "Switching active playlist");
        self.engine.load_queue(queue).await?;
        *self.active.write().await = index;
        tracing::info!(playlist = index, "Active playlist switched");
        Ok(())
    }

    async fn resolve_alias(&self, name: &str) -> Option<VoiceAlias> {
        let wanted = name.trim();
        if wanted.is_empty() {
            return None;
        }
        self.data
            .read()
            .await
            .voice_aliases
            .iter()
            .find(|alias| alias.name.eq_ignore_ascii_case(wanted))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PlaybackState;
    use crate::testing::{Call, RecordingEngine};

    const LIBRARY: &str = r#"
[[tracks]]
id = "a"
title = "Alpha"
duration_ms = 1000

[[tracks]]
id = "b"
title = "Beta"

[[playlists]]
name = "One"
items = ["a", "b"]

[[playlists]]
name = "Two"
items = ["b", "missing"]

[[voice_aliases]]
name = "Beta Song"
track_id = "b"
playlist = 1
"#;

    #[test]
    fn test_parse_library_toml() {
        let data = LibraryData::from_toml_str(LIBRARY).unwrap();
        assert_eq!(data.tracks.len(), 2);
        assert_eq!(data.playlists[1].items, vec!["b", "missing"]);
        assert_eq!(data.voice_aliases[0].playlist, 1);
        assert_eq!(data.tracks[1].duration_ms, 0);
    }

    #[test]
    fn test_playlist_tracks_skips_unknown_ids() {
        let data = LibraryData::from_toml_str(LIBRARY).unwrap();
        let tracks = data.playlist_tracks(1);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, "b");
        assert!(data.playlist_tracks(7).is_empty());
    }

    #[test]
    fn test_alias_pointing_outside_playlist_is_rejected() {
        let broken = LIBRARY.replace("playlist = 1", "playlist = 4");
        assert!(matches!(
            LibraryData::from_toml_str(&broken),
            Err(PlayerError::Config(_))
        ));

        let wrong_track = LIBRARY.replace("track_id = \"b\"", "track_id = \"a\"");
        assert!(LibraryData::from_toml_str(&wrong_track).is_err());
    }

    #[test]
    fn test_demo_library_is_consistent() {
        let demo = LibraryData::demo();
        assert!(demo.validate().is_ok());
        assert_eq!(demo.voice_aliases.len(), 2);
    }

    #[tokio::test]
    async fn test_switch_active_loads_engine_queue() {
        let engine = RecordingEngine::new(PlaybackState::Idle);
        let library = Library::new(LibraryData::from_toml_str(LIBRARY).unwrap(), engine.clone());

        library.switch_active(1).await.unwrap();

        assert_eq!(library.active().await, 1);
        assert_eq!(engine.calls(), vec![Call::LoadQueue(vec!["b".to_string()])]);
    }

    #[tokio::test]
    async fn test_switch_active_out_of_range() {
        let engine = RecordingEngine::new(PlaybackState::Idle);
        let library = Library::new(LibraryData::from_toml_str(LIBRARY).unwrap(), engine.clone());

        let err = library.switch_active(5).await.unwrap_err();
        assert!(matches!(err, PlayerError::PlaylistOutOfRange { index: 5, count: 2 }));
        assert_eq!(library.active().await, 0);
        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_alias_ignores_case_and_whitespace() {
        let engine = RecordingEngine::new(PlaybackState::Idle);
        let library = Library::new(LibraryData::from_toml_str(LIBRARY).unwrap(), engine);

        let alias = library.resolve_alias("  beta song ").await.unwrap();
        assert_eq!(alias.track_id, "b");
        assert_eq!(alias.playlist, 1);
        assert!(library.resolve_alias("Gamma").await.is_none());
        assert!(library.resolve_alias("").await.is_none());
    }

    #[tokio::test]
    async fn test_replace_clamps_active_playlist() {
        let engine = RecordingEngine::new(PlaybackState::Idle);
        let library = Library::new(LibraryData::from_toml_str(LIBRARY).unwrap(), engine.clone());
        library.switch_active(1).await.unwrap();

        let mut smaller = LibraryData::from_toml_str(LIBRARY).unwrap();
        smaller.playlists.truncate(1);
        smaller.voice_aliases.clear();
        library.replace(smaller).await.unwrap();

        assert_eq!(library.active().await, 0);
        assert_eq!(
            engine.calls().last(),
            Some(&Call::LoadQueue(vec!["a".to_string(), "b".to_string()]))
        );
    }

    #[tokio::test]
    async fn test_replace_with_no_playlists_clears_queue() {
        let engine = RecordingEngine::new(PlaybackState::Playing);
        let library = Library::new(LibraryData::from_toml_str(LIBRARY).unwrap(), engine.clone());
        library.switch_active(1).await.unwrap();

        library.replace(LibraryData::default()).await.unwrap();

        assert_eq!(library.active().await, 0);
        assert!(library.lists().await.is_empty());
        assert_eq!(engine.calls().last(), Some(&Call::LoadQueue(Vec::new())));
    }
}
