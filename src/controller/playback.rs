//! Playback control methods

use tokio::sync::broadcast::{self, error::RecvError};

use crate::engine::{PlaybackState, PlayerEvent};
use crate::error::Result;
use crate::model::{PlaylistStore, RepeatState};

use super::AppController;

impl AppController {
    /// Switch to `playlist_index` if needed, jump to `track_id`, and start
    /// playback once the engine is ready if it was not already playing.
    ///
    /// A call supersedes the resume wait of any earlier call.
    pub async fn select_track(&self, track_id: &str, playlist_index: usize) -> Result<()> {
        let _guard = self.select_lock.lock().await;
        tracing::debug!(track_id, playlist_index, "Selecting track");

        self.cancel_pending_resume().await;

        if self.library.active().await != playlist_index {
            self.library.switch_active(playlist_index).await?;
            self.refresh_library_view().await;
        }

        let state_before = self.engine.state().await;

        // Subscribe before the skip so a fast ready event is not missed
        let ready_rx = (state_before != PlaybackState::Playing).then(|| self.engine.subscribe());

        self.engine.skip(track_id).await?;
        tracing::info!(track_id, playlist_index, ?state_before, "Skipped to selected track");

        if let Some(rx) = ready_rx {
            self.arm_resume(rx).await;
        }

        self.refresh_adjacency().await;
        Ok(())
    }

    /// [`AppController::select_track`] for UI callers: failures go to the error popup
    pub async fn play_selected(&self, track_id: &str, playlist_index: usize) {
        let result = self.select_track(track_id, playlist_index).await;
        self.report("select", result).await;
    }

    /// Drop the resume wait of the last select, if it is still armed
    async fn cancel_pending_resume(&self) {
        if let Some(previous) = self.pending_resume.lock().await.take() {
            previous.cancel();
        }
    }

    /// Play once on the first ready event, then drop the subscription.
    ///
    /// The wait also ends without playing when the engine reports Playing,
    /// Paused or Stopped first: the transport has settled some other way.
    async fn arm_resume(&self, mut rx: broadcast::Receiver<PlayerEvent>) {
        let token = self.shutdown.child_token();
        *self.pending_resume.lock().await = Some(token.clone());
        let engine = self.engine.clone();

        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        tracing::debug!("Resume wait cancelled");
                        return;
                    }
                    event = rx.recv() => event,
                };

                match event {
                    Ok(PlayerEvent::StateChanged(PlaybackState::Ready)) => break,
                    Ok(PlayerEvent::StateChanged(
                        state @ (PlaybackState::Playing | PlaybackState::Paused | PlaybackState::Stopped),
                    )) => {
                        tracing::debug!(?state, "Resume wait settled without ready");
                        return;
                    }
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Resume wait lagged behind engine events");
                        continue;
                    }
                    Err(RecvError::Closed) => return,
                }
            }
            drop(rx);

            if token.is_cancelled() {
                return;
            }
            match engine.play().await {
                Ok(()) => tracing::info!("Resumed playback after skip"),
                Err(e) => tracing::error!(error = %e, "Resume after skip failed"),
            }
        });
    }

    pub async fn toggle_playback(&self) {
        let is_playing = self.engine.state().await == PlaybackState::Playing;
        tracing::debug!(is_playing, "Toggling playback");
        if is_playing {
            self.pause().await;
        } else {
            self.play().await;
        }
    }

    pub async fn play(&self) {
        self.cancel_pending_resume().await;
        let result = self.engine.play().await;
        self.report("play", result).await;
    }

    pub async fn pause(&self) {
        self.cancel_pending_resume().await;
        let result = self.engine.pause().await;
        self.report("pause", result).await;
    }

    pub async fn next_track(&self) {
        tracing::debug!("Skipping to next track");
        self.cancel_pending_resume().await;
        let result = self.engine.skip_to_next().await;
        self.report("next", result).await;
    }

    pub async fn previous_track(&self) {
        self.cancel_pending_resume().await;
        let result = self.engine.skip_to_previous().await;
        self.report("previous", result).await;
    }

    /// Restart the current track
    pub async fn replay(&self) {
        let result = self.engine.seek_to(0).await;
        self.report("replay", result).await;
    }

    pub async fn set_shuffle(&self, enabled: bool) {
        match self.engine.set_shuffle(enabled).await {
            Ok(()) => {
                let model = self.model.lock().await;
                let repeat = model.get_repeat_state().await;
                model.update_modes(enabled, repeat).await;
                tracing::info!(enabled, "Shuffle changed");
            }
            Err(e) => self.report("shuffle", Err(e)).await,
        }
    }

    pub async fn toggle_shuffle(&self) {
        let current = self.model.lock().await.get_shuffle_state().await;
        self.set_shuffle(!current).await;
    }

    pub async fn set_repeat(&self, mode: RepeatState) {
        match self.engine.set_repeat(mode).await {
            Ok(()) => {
                let model = self.model.lock().await;
                let shuffle = model.get_shuffle_state().await;
                model.update_modes(shuffle, mode).await;
                tracing::info!(?mode, "Repeat changed");
            }
            Err(e) => self.report("repeat", Err(e)).await,
        }
    }

    pub async fn cycle_repeat(&self) {
        let current = self.model.lock().await.get_repeat_state().await;
        self.set_repeat(current.cycle()).await;
    }

    async fn report(&self, action: &'static str, result: Result<()>) {
        match result {
            Ok(()) => tracing::debug!(action, "Playback command applied"),
            Err(e) => {
                tracing::error!(action, error = %e, "Playback command failed");
                let model = self.model.lock().await;
                model.set_error(Self::format_error(&e)).await;
            }
        }
    }
}
