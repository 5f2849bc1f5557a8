//! Engine event listener

use tokio::sync::broadcast::error::RecvError;

use crate::engine::PlayerEvent;
use super::AppController;

impl AppController {
    pub(crate) fn start_player_event_listener(&self) {
        let mut events = self.engine.subscribe();
        let controller = self.clone();
        let token = self.shutdown.child_token();
        tracing::info!(engine = self.engine.name(), "Starting player event listener");

        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = token.cancelled() => break,
                    event = events.recv() => event,
                };
                let event = match event {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Player event listener lagged");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                if controller.model.lock().await.should_quit().await {
                    tracing::debug!("Player event listener shutting down");
                    break;
                }
                controller.handle_player_event(event).await;
            }
        });
    }

    pub(crate) async fn handle_player_event(&self, event: PlayerEvent) {
        match event {
            PlayerEvent::StateChanged(state) => {
                tracing::debug!(?state, "PlayerEvent::StateChanged");
                let model = self.model.lock().await;
                model.update_playback_state(state).await;
            }
            PlayerEvent::TrackChanged { track } => {
                tracing::info!(
                    track_id = %track.id,
                    title = %track.title,
                    artist = %track.artist,
                    duration_ms = track.duration_ms,
                    "PlayerEvent::TrackChanged"
                );
                {
                    let model = self.model.lock().await;
                    model.update_track(track).await;
                }
                self.refresh_adjacency().await;
            }
            PlayerEvent::Progress { position_ms, duration_ms } => {
                tracing::trace!(position_ms, duration_ms, "PlayerEvent::Progress");
                let model = self.model.lock().await;
                model.update_playback_position(position_ms, duration_ms).await;
            }
            PlayerEvent::ModeChanged { shuffle, repeat } => {
                tracing::debug!(shuffle, ?repeat, "PlayerEvent::ModeChanged");
                let model = self.model.lock().await;
                model.update_modes(shuffle, repeat).await;
            }
            PlayerEvent::QueueEnded => {
                tracing::info!("PlayerEvent::QueueEnded");
            }
        }
    }
}
