//! Voice command bridge
//!
//! A recogniser (or the TUI voice prompt) publishes [`VoicePayload`]s on the
//! bridge; the controller subscribes while it is active and maps them to
//! [`VoiceCommand`]s.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

const BRIDGE_CAPACITY: usize = 32;

/// Raw event as delivered by the recogniser: `{"command": "onOpen", "name": "Precious"}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoicePayload {
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl VoicePayload {
    pub fn new(command: impl Into<String>) -> Self {
        Self { command: command.into(), name: None }
    }

    pub fn with_name(command: impl Into<String>, name: impl Into<String>) -> Self {
        Self { command: command.into(), name: Some(name.into()) }
    }

    /// Turn a typed utterance ("next", "open Precious", "enable shuffle") into a payload.
    ///
    /// Unrecognised phrases still produce a payload; the dispatcher ignores them.
    pub fn from_utterance(utterance: &str) -> Option<Self> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return None;
        }
        // Keep the original casing of the track name
        if utterance.len() > 5 && utterance.is_char_boundary(5) && utterance[..5].eq_ignore_ascii_case("open ") {
            return Some(Self::with_name("onOpen", utterance[5..].trim()));
        }

        let lower = utterance.to_lowercase();

        let command = match lower.as_str() {
            "next" => "onNext",
            "previous" | "prev" => "onPrevious",
            "pause" => "onPause",
            "play" => "onPlay",
            "replay" => "onReplay",
            "help" => "onHelp",
            "open" => "onOpen",
            "enable shuffle" => "onEnableShuffle",
            "disable shuffle" => "onDisableShuffle",
            "enable repeat" => "onEnableRepeat",
            "disable repeat" => "onDisableRepeat",
            _ => return Some(Self::new(utterance)),
        };
        Some(Self::new(command))
    }
}

/// Commands the player screen understands
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoiceCommand {
    Next,
    Previous,
    Pause,
    Play,
    Replay,
    Open(String),
    Help,
    Shuffle(bool),
    Repeat(bool),
}

impl VoiceCommand {
    /// `None` for command names outside the table
    pub fn from_payload(payload: &VoicePayload) -> Option<Self> {
        let command = match payload.command.as_str() {
            "onNext" => VoiceCommand::Next,
            "onPrevious" => VoiceCommand::Previous,
            "onPause" => VoiceCommand::Pause,
            "onPlay" => VoiceCommand::Play,
            "onReplay" => VoiceCommand::Replay,
            "onOpen" => VoiceCommand::Open(payload.name.clone().unwrap_or_default()),
            "onHelp" => VoiceCommand::Help,
            "onEnableShuffle" => VoiceCommand::Shuffle(true),
            "onDisableShuffle" => VoiceCommand::Shuffle(false),
            "onEnableRepeat" => VoiceCommand::Repeat(true),
            "onDisableRepeat" => VoiceCommand::Repeat(false),
            _ => return None,
        };
        Some(command)
    }
}

/// Channel between the recogniser and whoever is listening
#[derive(Clone)]
pub struct VoiceBridge {
    tx: broadcast::Sender<VoicePayload>,
}

impl VoiceBridge {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BRIDGE_CAPACITY);
        Self { tx }
    }

    /// Publish a payload; returns false when nobody is subscribed
    pub fn send(&self, payload: VoicePayload) -> bool {
        tracing::debug!(
            command = %payload.command,
            name = ?payload.name,
            received_at = %chrono::Local::now().format("%H:%M:%S%.3f"),
            "Voice payload received"
        );
        self.tx.send(payload).is_ok()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<VoicePayload> {
        self.tx.subscribe()
    }
}

impl Default for VoiceBridge {
    fn default() -> Self {
        Self::new()
    }
}

/// Active listener on the bridge. Dropping it stops the listener.
pub struct VoiceSubscription {
    token: CancellationToken,
}

impl VoiceSubscription {
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn release(self) {
        if self.is_active() {
            tracing::debug!("Releasing voice subscription");
            self.token.cancel();
        }
    }
}

impl Drop for VoiceSubscription {
    fn drop(&mut self) {
        if !self.token.is_cancelled() {
            tracing::debug!("Releasing voice subscription");
            self.token.cancel();
        }
    }
}

/// Forward JSON-lines payloads from `path` (a file or FIFO) onto the bridge.
///
/// Malformed lines are logged and skipped. Returns when the file ends or the
/// token is cancelled.
pub async fn run_voice_feed(path: PathBuf, bridge: VoiceBridge, token: CancellationToken) -> crate::error::Result<()> {
    let file = tokio::fs::File::open(&path).await?;
    tracing::info!(path = %path.display(), "Voice feed opened");
    let mut lines = BufReader::new(file).lines();

    loop {
        let line = tokio::select! {
            _ = token.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            break;
        };
        if let Some(payload) = parse_feed_line(&line, &path) {
            bridge.send(payload);
        }
    }

    tracing::info!(path = %path.display(), "Voice feed closed");
    Ok(())
}

fn parse_feed_line(line: &str, path: &Path) -> Option<VoicePayload> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str::<VoicePayload>(line) {
        Ok(payload) => Some(payload),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Skipping malformed voice feed line");
            None
        }
    }
}
