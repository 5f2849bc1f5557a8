//! Voice command dispatch

use tokio::sync::broadcast::error::RecvError;

use crate::model::{PlaylistStore, RepeatState};
use crate::voice::{VoiceBridge, VoiceCommand, VoicePayload, VoiceSubscription};

use super::AppController;

impl AppController {
    /// Listen on `bridge` until the returned guard is released or dropped
    pub fn subscribe_voice(&self, bridge: &VoiceBridge) -> VoiceSubscription {
        let token = self.shutdown.child_token();
        let mut rx = bridge.subscribe();
        let controller = self.clone();
        let task_token = token.clone();
        tracing::info!("Voice subscription active");

        tokio::spawn(async move {
            loop {
                let payload = tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    payload = rx.recv() => payload,
                };
                match payload {
                    Ok(payload) => controller.handle_voice_payload(payload).await,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Dropped voice payloads");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            tracing::debug!("Voice listener stopped");
        });

        VoiceSubscription::new(token)
    }

    pub async fn handle_voice_payload(&self, payload: VoicePayload) {
        let Some(command) = VoiceCommand::from_payload(&payload) else {
            tracing::debug!(command = %payload.command, "Ignoring unknown voice command");
            return;
        };

        {
            let model = self.model.lock().await;
            let label = match &payload.name {
                Some(name) => format!("{} {}", payload.command, name),
                None => payload.command.clone(),
            };
            model.set_last_voice_command(label).await;
        }

        self.dispatch_voice_command(command).await;
    }

    pub async fn dispatch_voice_command(&self, command: VoiceCommand) {
        tracing::info!(?command, "Voice command");
        match command {
            VoiceCommand::Next => self.next_track().await,
            VoiceCommand::Previous => self.previous_track().await,
            VoiceCommand::Pause => self.pause().await,
            VoiceCommand::Play => self.play().await,
            VoiceCommand::Replay => self.replay().await,
            VoiceCommand::Open(name) => self.open_by_name(&name).await,
            VoiceCommand::Help => {
                let model = self.model.lock().await;
                model.show_help().await;
            }
            VoiceCommand::Shuffle(enabled) => self.set_shuffle(enabled).await,
            VoiceCommand::Repeat(enabled) => {
                let mode = if enabled { RepeatState::All } else { RepeatState::Off };
                self.set_repeat(mode).await;
            }
        }
    }

    async fn open_by_name(&self, name: &str) {
        let Some(alias) = self.library.resolve_alias(name).await else {
            tracing::debug!(name, "No track mapped to spoken name");
            return;
        };
        self.play_selected(&alias.track_id, alias.playlist).await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::super::test_support::controller_with;
    use super::*;
    use crate::engine::PlaybackState;
    use crate::testing::{eventually, Call};

    #[tokio::test]
    async fn test_transport_commands_map_to_engine_calls() {
        let (controller, engine) = controller_with(PlaybackState::Playing).await;

        for command in ["onNext", "onPrevious", "onPause", "onPlay", "onReplay"] {
            controller.handle_voice_payload(VoicePayload::new(command)).await;
        }

        assert_eq!(
            engine.calls(),
            vec![Call::SkipToNext, Call::SkipToPrevious, Call::Pause, Call::Play, Call::SeekTo(0)]
        );
    }

    #[tokio::test]
    async fn test_open_known_name_runs_select() {
        let (controller, engine) = controller_with(PlaybackState::Playing).await;

        controller
            .handle_voice_payload(VoicePayload::with_name("onOpen", "four"))
            .await;

        assert_eq!(
            engine.calls(),
            vec![
                Call::LoadQueue(vec!["4".to_string(), "2".to_string()]),
                Call::State,
                Call::Skip("4".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_open_unmapped_name_does_nothing() {
        let (controller, engine) = controller_with(PlaybackState::Paused).await;

        controller
            .handle_voice_payload(VoicePayload::with_name("onOpen", "Bohemian Rhapsody"))
            .await;
        controller.handle_voice_payload(VoicePayload::new("onOpen")).await;

        assert!(engine.calls().is_empty());
        assert!(!controller.model.lock().await.has_error().await);
    }

    #[tokio::test]
    async fn test_unknown_command_is_ignored() {
        let (controller, engine) = controller_with(PlaybackState::Paused).await;

        controller.handle_voice_payload(VoicePayload::new("onDance")).await;

        assert!(engine.calls().is_empty());
        let ui = controller.model.lock().await.get_ui_state().await;
        assert_eq!(ui.last_voice_command, None);
        assert!(ui.error_message.is_none());
    }

    #[tokio::test]
    async fn test_help_shows_overlay_and_ok_hides_it() {
        let (controller, _engine) = controller_with(PlaybackState::Paused).await;

        controller.handle_voice_payload(VoicePayload::new("onHelp")).await;
        assert!(controller.model.lock().await.is_help_open().await);

        controller.model.lock().await.confirm_help().await;
        assert!(!controller.model.lock().await.is_help_open().await);
    }

    #[tokio::test]
    async fn test_shuffle_and_repeat_commands() {
        let (controller, engine) = controller_with(PlaybackState::Paused).await;

        controller.handle_voice_payload(VoicePayload::new("onEnableShuffle")).await;
        controller.handle_voice_payload(VoicePayload::new("onEnableRepeat")).await;
        controller.handle_voice_payload(VoicePayload::new("onDisableRepeat")).await;

        assert_eq!(
            engine.calls(),
            vec![
                Call::SetShuffle(true),
                Call::SetRepeat(RepeatState::All),
                Call::SetRepeat(RepeatState::Off),
            ]
        );
    }

    #[tokio::test]
    async fn test_subscription_dispatches_until_released() {
        let (controller, engine) = controller_with(PlaybackState::Playing).await;
        let bridge = VoiceBridge::new();

        let subscription = controller.subscribe_voice(&bridge);
        assert!(bridge.send(VoicePayload::new("onNext")));
        assert!(eventually(|| engine.count(&Call::SkipToNext) == 1).await);

        subscription.release();
        tokio::time::sleep(Duration::from_millis(20)).await;
        bridge.send(VoicePayload::new("onNext"));
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(engine.count(&Call::SkipToNext), 1);
    }
}
