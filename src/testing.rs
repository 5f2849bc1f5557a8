//! Test doubles shared by the unit tests

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::engine::{PlaybackEngine, PlaybackState, PlayerEvent};
use crate::error::Result;
use crate::model::{LibraryData, Playlist, RepeatState, Track};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    LoadQueue(Vec<String>),
    Play,
    Pause,
    SeekTo(u32),
    Skip(String),
    SkipToNext,
    SkipToPrevious,
    State,
    SetShuffle(bool),
    SetRepeat(RepeatState),
}

/// Engine that records every call and only emits the events a test sends
pub struct RecordingEngine {
    calls: StdMutex<Vec<Call>>,
    state: StdMutex<PlaybackState>,
    events: broadcast::Sender<PlayerEvent>,
}

impl RecordingEngine {
    pub fn new(state: PlaybackState) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            calls: StdMutex::new(Vec::new()),
            state: StdMutex::new(state),
            events,
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn emit(&self, event: PlayerEvent) {
        let _ = self.events.send(event);
    }

    pub fn receiver_count(&self) -> usize {
        self.events.receiver_count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PlaybackEngine for RecordingEngine {
    fn name(&self) -> &str {
        "Recording Engine"
    }

    async fn load_queue(&self, tracks: Vec<Track>) -> Result<()> {
        self.record(Call::LoadQueue(tracks.into_iter().map(|t| t.id).collect()));
        Ok(())
    }

    async fn play(&self) -> Result<()> {
        self.record(Call::Play);
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        self.record(Call::Pause);
        Ok(())
    }

    async fn seek_to(&self, position_ms: u32) -> Result<()> {
        self.record(Call::SeekTo(position_ms));
        Ok(())
    }

    async fn skip(&self, track_id: &str) -> Result<()> {
        self.record(Call::Skip(track_id.to_string()));
        Ok(())
    }

    async fn skip_to_next(&self) -> Result<()> {
        self.record(Call::SkipToNext);
        Ok(())
    }

    async fn skip_to_previous(&self) -> Result<()> {
        self.record(Call::SkipToPrevious);
        Ok(())
    }

    async fn state(&self) -> PlaybackState {
        self.record(Call::State);
        *self.state.lock().unwrap()
    }

    async fn set_shuffle(&self, enabled: bool) -> Result<()> {
        self.record(Call::SetShuffle(enabled));
        Ok(())
    }

    async fn set_repeat(&self, mode: RepeatState) -> Result<()> {
        self.record(Call::SetRepeat(mode));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }
}

pub fn track(id: &str) -> Track {
    Track {
        id: id.to_string(),
        title: format!("Track {id}"),
        artist: "Tester".to_string(),
        album: String::new(),
        duration_ms: 120_000,
    }
}

/// Two playlists: `[1, 2, 3]` and `[4, 2]`, with aliases for tracks 1 and 4
pub fn sample_library() -> LibraryData {
    LibraryData {
        tracks: ["1", "2", "3", "4"].iter().map(|id| track(id)).collect(),
        playlists: vec![
            Playlist { name: "First".to_string(), items: vec!["1".into(), "2".into(), "3".into()] },
            Playlist { name: "Second".to_string(), items: vec!["4".into(), "2".into()] },
        ],
        voice_aliases: vec![
            crate::model::VoiceAlias { name: "One".to_string(), track_id: "1".to_string(), playlist: 0 },
            crate::model::VoiceAlias { name: "Four".to_string(), track_id: "4".to_string(), playlist: 1 },
        ],
    }
}

/// Poll `check` until it holds or a second passes
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    check()
}
