//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and view, and drives the playback engine.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `playback`: Transport control and the select-and-resume sequence
//! - `voice`: Voice command dispatch
//! - `visibility`: Panel progress, tweening and widget opacity
//! - `player_events`: Engine event listener

mod input;
mod playback;
mod voice;
mod visibility;
mod player_events;

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;

use crate::engine::PlaybackEngine;
use crate::error::PlayerError;
use crate::model::{Adjacency, AppModel, Library, LibraryData, PlaylistStore};
use crate::voice::VoiceBridge;

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) engine: Arc<dyn PlaybackEngine>,
    pub(crate) library: Arc<Library>,
    library_path: Option<PathBuf>,
    /// Utterances typed into the prompt are published here
    voice: VoiceBridge,
    /// Serializes the switch/state/skip steps of concurrent selects
    select_lock: Arc<Mutex<()>>,
    /// Token of the wait-for-ready task armed by the latest select
    pending_resume: Arc<Mutex<Option<CancellationToken>>>,
    progress_tx: Arc<watch::Sender<f32>>,
    tween: Arc<Mutex<Option<CancellationToken>>>,
    settings: ControllerSettings,
    /// Parent of every task the controller spawns
    shutdown: CancellationToken,
}

#[derive(Clone, Copy, Debug)]
pub struct ControllerSettings {
    pub progress_step: f32,
    pub tween: std::time::Duration,
}

impl AppController {
    pub fn new(
        model: Arc<Mutex<AppModel>>,
        engine: Arc<dyn PlaybackEngine>,
        library: Arc<Library>,
        library_path: Option<PathBuf>,
        settings: ControllerSettings,
    ) -> Self {
        let (progress_tx, _) = watch::channel(0.0);
        Self {
            model,
            engine,
            library,
            library_path,
            voice: VoiceBridge::new(),
            select_lock: Arc::new(Mutex::new(())),
            pending_resume: Arc::new(Mutex::new(None)),
            progress_tx: Arc::new(progress_tx),
            tween: Arc::new(Mutex::new(None)),
            settings,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn voice_bridge(&self) -> &VoiceBridge {
        &self.voice
    }

    /// Start the background listeners. Pair with [`AppController::deactivate`].
    pub async fn activate(&self) {
        self.start_player_event_listener();
        self.start_visibility_task();

        let engine_name = self.engine.name().to_string();
        let model = self.model.lock().await;
        model.update_engine_name(engine_name).await;
        drop(model);

        self.refresh_library_view().await;
        self.refresh_adjacency().await;
    }

    /// Cancel every task the controller started, including a pending resume
    pub fn deactivate(&self) {
        tracing::info!("Deactivating controller");
        self.shutdown.cancel();
    }

    /// Recompute previous/next from the current track and the active playlist.
    ///
    /// Holds the model lock from reading the current track until the result is
    /// stored, so a concurrent track change cannot be overwritten by stale data.
    pub(crate) async fn refresh_adjacency(&self) {
        let model = self.model.lock().await;
        let current = model.current_track_id().await;
        let active = self.library.active().await;
        let lists = self.library.lists().await;
        let tracks = self.library.tracks().await;

        let active_list = lists.get(active).map(|p| p.items.as_slice()).unwrap_or(&[]);
        let adjacency = Adjacency::compute(current.as_deref(), active_list, &tracks);
        tracing::trace!(
            current = ?current,
            previous = ?adjacency.previous.as_ref().map(|t| &t.id),
            next = ?adjacency.next.as_ref().map(|t| &t.id),
            "Adjacency recomputed"
        );

        model.set_adjacency(adjacency).await;
    }

    /// Push playlists and the selected playlist's tracks into the UI state
    pub(crate) async fn refresh_library_view(&self) {
        let lists = self.library.lists().await;
        let active = self.library.active().await;

        let model = self.model.lock().await;
        model.set_playlists(lists, active).await;
        let selected = model.get_selected_playlist().await.unwrap_or(active);
        let tracks = self.library.playlist_tracks(selected).await;
        model.set_track_list(tracks).await;
    }

    /// Re-read the library file and requeue the active playlist
    pub async fn reload_library(&self) {
        let Some(path) = self.library_path.clone() else {
            let model = self.model.lock().await;
            model.set_error("No library file configured; using the demo library".to_string()).await;
            return;
        };

        let result = match LibraryData::load(&path) {
            Ok(data) => {
                // A select in flight must not see the queue swapped under it
                let _guard = self.select_lock.lock().await;
                self.library.replace(data).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Library reloaded");
                self.refresh_library_view().await;
                self.refresh_adjacency().await;
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Library reload failed");
                let model = self.model.lock().await;
                model.set_error(Self::format_error(&e)).await;
            }
        }
    }

    pub(crate) fn format_error(error: &PlayerError) -> String {
        match error {
            PlayerError::EmptyQueue => "Nothing queued. Pick a playlist first.".to_string(),
            PlayerError::EndOfQueue => "No more tracks in this direction.".to_string(),
            PlayerError::TrackNotFound(id) => format!("Track '{}' is not in the queue.", id),
            PlayerError::Unsupported(what) => format!("Not available: {}", what),
            other => format!("Error: {}", other),
        }
    }
}


#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::test_support::{controller_from_file, controller_with};
    use super::*;
    use crate::engine::{PlaybackState, PlayerEvent};
    use crate::testing::{eventually, track, Call};

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_adjacency_matches_track_after_concurrent_change() {
        let (controller, _engine) = controller_with(PlaybackState::Playing).await;
        let tracks = controller.library.tracks().await;
        let first = controller.library.lists().await[0].items.clone();

        for round in 0..50 {
            let id = first[round % first.len()].clone();
            tokio::join!(
                controller.refresh_adjacency(),
                controller.handle_player_event(PlayerEvent::TrackChanged { track: track(&id) }),
            );

            let model = controller.model.lock().await;
            let current = model.current_track_id().await;
            assert_eq!(current.as_deref(), Some(id.as_str()));
            assert_eq!(
                model.get_adjacency().await,
                Adjacency::compute(current.as_deref(), &first, &tracks),
                "round {round}"
            );
        }
    }

    #[tokio::test]
    async fn test_reload_waits_for_select_in_flight() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            toml::to_string(&crate::testing::sample_library()).unwrap().as_bytes(),
        )
        .unwrap();
        let (controller, engine) = controller_from_file(file.path().to_path_buf()).await;

        let guard = controller.select_lock.lock().await;
        let reload = tokio::spawn({
            let controller = controller.clone();
            async move { controller.reload_library().await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!engine.calls().iter().any(|c| matches!(c, Call::LoadQueue(_))));

        drop(guard);
        reload.await.unwrap();
        assert!(eventually(|| engine.calls().iter().any(|c| matches!(c, Call::LoadQueue(_)))).await);
        assert!(!controller.model.lock().await.has_error().await);
    }
}
