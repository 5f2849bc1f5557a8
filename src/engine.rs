//! Playback engine abstraction and the in-process local engine
//!
//! The controller only talks to [`PlaybackEngine`]. `LocalEngine` is a
//! simulated transport: it keeps a queue, a transport state and a position
//! clock, and reports every change on a broadcast channel. It does not
//! decode audio.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;

use crate::error::{PlayerError, Result};
use crate::model::{RepeatState, Track};

const ENGINE_NAME: &str = "Local Engine";
const EVENT_CAPACITY: usize = 64;
const CLOCK_TICK: Duration = Duration::from_millis(500);

/// Transport state as reported by the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Stopped,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PlayerEvent {
    StateChanged(PlaybackState),
    TrackChanged { track: Track },
    Progress { position_ms: u32, duration_ms: u32 },
    ModeChanged { shuffle: bool, repeat: RepeatState },
    QueueEnded,
}

#[async_trait]
pub trait PlaybackEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Replace the queue. The transport stops on the first track.
    async fn load_queue(&self, tracks: Vec<Track>) -> Result<()>;

    async fn play(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    async fn seek_to(&self, position_ms: u32) -> Result<()>;

    /// Jump to a queued track by id
    async fn skip(&self, track_id: &str) -> Result<()>;

    async fn skip_to_next(&self) -> Result<()>;

    async fn skip_to_previous(&self) -> Result<()>;

    async fn state(&self) -> PlaybackState;

    async fn set_shuffle(&self, enabled: bool) -> Result<()>;

    async fn set_repeat(&self, mode: RepeatState) -> Result<()>;

    /// Receive engine events from now on. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<PlayerEvent>;
}

struct Transport {
    queue: Vec<Track>,
    current: Option<usize>,
    state: PlaybackState,
    position_ms: u32,
    resumed_at: Option<Instant>,
    play_when_ready: bool,
    shuffle: bool,
    shuffle_order: Vec<usize>,
    repeat: RepeatState,
    load_generation: u64,
    rng: StdRng,
}

impl Transport {
    fn new() -> Self {
        Self {
            queue: Vec::new(),
            current: None,
            state: PlaybackState::Idle,
            position_ms: 0,
            resumed_at: None,
            play_when_ready: false,
            shuffle: false,
            shuffle_order: Vec::new(),
            repeat: RepeatState::Off,
            load_generation: 0,
            rng: StdRng::from_entropy(),
        }
    }

    fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.queue.get(i))
    }

    fn duration_ms(&self) -> u32 {
        self.current_track().map(|t| t.duration_ms).unwrap_or(0)
    }

    fn position_ms(&self) -> u32 {
        let position = match (self.state, self.resumed_at) {
            (PlaybackState::Playing, Some(since)) => {
                let elapsed = since.elapsed().as_millis().min(u32::MAX as u128) as u32;
                self.position_ms.saturating_add(elapsed)
            }
            _ => self.position_ms,
        };
        match self.duration_ms() {
            0 => position,
            duration => position.min(duration),
        }
    }

    /// Fold the running clock into `position_ms`
    fn freeze_position(&mut self) {
        self.position_ms = self.position_ms();
        self.resumed_at = None;
    }

    /// Shuffle order with the current track first
    fn rebuild_shuffle_order(&mut self) {
        let mut order: Vec<usize> = (0..self.queue.len()).collect();
        order.shuffle(&mut self.rng);
        if let Some(current) = self.current {
            if let Some(pos) = order.iter().position(|&i| i == current) {
                order.swap(0, pos);
            }
        }
        self.shuffle_order = order;
    }

    fn step(&mut self, forward: bool) -> Option<usize> {
        let len = self.queue.len();
        let current = self.current?;
        let wrap = self.repeat == RepeatState::All;

        if self.shuffle {
            if self.shuffle_order.len() != len {
                self.rebuild_shuffle_order();
            }
            let pos = self.shuffle_order.iter().position(|&i| i == current)?;
            let target = step_index(pos, len, forward, wrap)?;
            self.shuffle_order.get(target).copied()
        } else {
            step_index(current, len, forward, wrap)
        }
    }
}

fn step_index(pos: usize, len: usize, forward: bool, wrap: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if forward {
        if pos + 1 < len {
            Some(pos + 1)
        } else if wrap {
            Some(0)
        } else {
            None
        }
    } else if pos > 0 {
        Some(pos - 1)
    } else if wrap {
        Some(len - 1)
    } else {
        None
    }
}

struct Shared {
    transport: Mutex<Transport>,
    events: broadcast::Sender<PlayerEvent>,
    load_delay: Duration,
}

impl Shared {
    fn emit(&self, event: PlayerEvent) {
        // No subscribers is fine; nobody is listening yet
        let _ = self.events.send(event);
    }

    fn set_state(&self, transport: &mut Transport, state: PlaybackState) {
        if transport.state != state {
            transport.state = state;
            self.emit(PlayerEvent::StateChanged(state));
        }
    }

    /// Move to `index` and schedule the simulated load
    fn begin_load(self: &Arc<Self>, transport: &mut Transport, index: usize) {
        let resume = transport.state == PlaybackState::Playing || transport.play_when_ready;

        transport.current = Some(index);
        transport.position_ms = 0;
        transport.resumed_at = None;
        transport.play_when_ready = resume;
        transport.load_generation += 1;
        let generation = transport.load_generation;

        if let Some(track) = transport.current_track().cloned() {
            tracing::debug!(track_id = %track.id, resume, "Loading track");
            self.emit(PlayerEvent::TrackChanged { track });
        }
        // Always announce the load, even when already loading
        transport.state = PlaybackState::Loading;
        self.emit(PlayerEvent::StateChanged(PlaybackState::Loading));

        let shared = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(shared.load_delay).await;
            let mut transport = shared.transport.lock().await;
            if transport.load_generation != generation || transport.state != PlaybackState::Loading {
                return;
            }
            if transport.play_when_ready {
                transport.play_when_ready = false;
                transport.resumed_at = Some(Instant::now());
                shared.set_state(&mut transport, PlaybackState::Playing);
            } else {
                shared.set_state(&mut transport, PlaybackState::Ready);
            }
        });
    }

    async fn tick(self: &Arc<Self>) {
        let mut transport = self.transport.lock().await;
        if transport.state != PlaybackState::Playing {
            return;
        }

        let duration_ms = transport.duration_ms();
        let position_ms = transport.position_ms();
        if duration_ms == 0 || position_ms < duration_ms {
            self.emit(PlayerEvent::Progress { position_ms, duration_ms });
            return;
        }

        if transport.repeat == RepeatState::One {
            transport.position_ms = 0;
            transport.resumed_at = Some(Instant::now());
            self.emit(PlayerEvent::Progress { position_ms: 0, duration_ms });
            return;
        }

        match transport.step(true) {
            Some(next) => self.begin_load(&mut transport, next),
            None => {
                tracing::info!("Reached end of queue");
                transport.freeze_position();
                transport.position_ms = 0;
                self.set_state(&mut transport, PlaybackState::Stopped);
                self.emit(PlayerEvent::QueueEnded);
            }
        }
    }
}

/// Simulated engine driven by a background clock
pub struct LocalEngine {
    shared: Arc<Shared>,
    clock: CancellationToken,
}

impl LocalEngine {
    /// Must be called inside a tokio runtime; starts the position clock.
    pub fn new(load_delay: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let shared = Arc::new(Shared {
            transport: Mutex::new(Transport::new()),
            events,
            load_delay,
        });
        let clock = CancellationToken::new();

        let clock_shared = shared.clone();
        let clock_token = clock.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLOCK_TICK);
            loop {
                tokio::select! {
                    _ = clock_token.cancelled() => break,
                    _ = interval.tick() => clock_shared.tick().await,
                }
            }
            tracing::debug!("Engine clock stopped");
        });

        Self { shared, clock }
    }
}

#[cfg(test)]
impl LocalEngine {
    pub async fn position_ms(&self) -> u32 {
        self.shared.transport.lock().await.position_ms()
    }

    pub async fn current_track(&self) -> Option<Track> {
        self.shared.transport.lock().await.current_track().cloned()
    }
}

impl Drop for LocalEngine {
    fn drop(&mut self) {
        self.clock.cancel();
    }
}

#[async_trait]
impl PlaybackEngine for LocalEngine {
    fn name(&self) -> &str {
        ENGINE_NAME
    }

    async fn load_queue(&self, tracks: Vec<Track>) -> Result<()> {
        let mut transport = self.shared.transport.lock().await;
        transport.queue = tracks;
        transport.current = if transport.queue.is_empty() { None } else { Some(0) };
        transport.position_ms = 0;
        transport.resumed_at = None;
        transport.play_when_ready = false;
        transport.load_generation += 1;
        if transport.shuffle {
            transport.rebuild_shuffle_order();
        }

        self.shared.set_state(&mut transport, PlaybackState::Stopped);
        if let Some(track) = transport.current_track().cloned() {
            self.shared.emit(PlayerEvent::TrackChanged { track });
        }
        tracing::debug!(tracks = transport.queue.len(), "Queue loaded");
        Ok(())
    }

    async fn play(&self) -> Result<()> {
        let mut transport = self.shared.transport.lock().await;
        match transport.state {
            PlaybackState::Playing => Ok(()),
            PlaybackState::Loading => {
                transport.play_when_ready = true;
                Ok(())
            }
            _ => {
                if transport.current.is_none() {
                    return Err(PlayerError::EmptyQueue);
                }
                if transport.state == PlaybackState::Stopped && transport.position_ms >= transport.duration_ms() {
                    transport.position_ms = 0;
                }
                transport.resumed_at = Some(Instant::now());
                self.shared.set_state(&mut transport, PlaybackState::Playing);
                Ok(())
            }
        }
    }

    async fn pause(&self) -> Result<()> {
        let mut transport = self.shared.transport.lock().await;
        match transport.state {
            PlaybackState::Playing => {
                transport.freeze_position();
                self.shared.set_state(&mut transport, PlaybackState::Paused);
            }
            PlaybackState::Loading => transport.play_when_ready = false,
            _ => {}
        }
        Ok(())
    }

    async fn seek_to(&self, position_ms: u32) -> Result<()> {
        let mut transport = self.shared.transport.lock().await;
        if transport.current.is_none() {
            return Err(PlayerError::EmptyQueue);
        }
        let duration_ms = transport.duration_ms();
        let position_ms = if duration_ms > 0 { position_ms.min(duration_ms) } else { position_ms };

        transport.position_ms = position_ms;
        if transport.state == PlaybackState::Playing {
            transport.resumed_at = Some(Instant::now());
        }
        self.shared.emit(PlayerEvent::Progress { position_ms, duration_ms });
        Ok(())
    }

    async fn skip(&self, track_id: &str) -> Result<()> {
        let mut transport = self.shared.transport.lock().await;
        let index = transport
            .queue
            .iter()
            .position(|t| t.id == track_id)
            .ok_or_else(|| PlayerError::TrackNotFound(track_id.to_string()))?;
        self.shared.begin_load(&mut transport, index);
        Ok(())
    }

    async fn skip_to_next(&self) -> Result<()> {
        let mut transport = self.shared.transport.lock().await;
        if transport.queue.is_empty() {
            return Err(PlayerError::EmptyQueue);
        }
        let next = transport.step(true).ok_or(PlayerError::EndOfQueue)?;
        self.shared.begin_load(&mut transport, next);
        Ok(())
    }

    async fn skip_to_previous(&self) -> Result<()> {
        let mut transport = self.shared.transport.lock().await;
        if transport.queue.is_empty() {
            return Err(PlayerError::EmptyQueue);
        }
        let previous = transport.step(false).ok_or(PlayerError::EndOfQueue)?;
        self.shared.begin_load(&mut transport, previous);
        Ok(())
    }

    async fn state(&self) -> PlaybackState {
        self.shared.transport.lock().await.state
    }

    async fn set_shuffle(&self, enabled: bool) -> Result<()> {
        let mut transport = self.shared.transport.lock().await;
        transport.shuffle = enabled;
        if enabled {
            transport.rebuild_shuffle_order();
        }
        let repeat = transport.repeat;
        self.shared.emit(PlayerEvent::ModeChanged { shuffle: enabled, repeat });
        Ok(())
    }

    async fn set_repeat(&self, mode: RepeatState) -> Result<()> {
        let mut transport = self.shared.transport.lock().await;
        transport.repeat = mode;
        let shuffle = transport.shuffle;
        self.shared.emit(PlayerEvent::ModeChanged { shuffle, repeat: mode });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.shared.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, duration_ms: u32) -> Track {
        Track {
            id: id.to_string(),
            title: format!("Track {id}"),
            artist: String::new(),
            album: String::new(),
            duration_ms,
        }
    }

    fn queue() -> Vec<Track> {
        vec![track("a", 60_000), track("b", 60_000), track("c", 60_000)]
    }

    async fn next_state(rx: &mut broadcast::Receiver<PlayerEvent>) -> PlaybackState {
        loop {
            let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
                .await
                .expect("timed out waiting for engine event")
                .unwrap();
            if let PlayerEvent::StateChanged(state) = event {
                return state;
            }
        }
    }

    #[test]
    fn test_step_index_boundaries() {
        assert_eq!(step_index(0, 3, true, false), Some(1));
        assert_eq!(step_index(2, 3, true, false), None);
        assert_eq!(step_index(2, 3, true, true), Some(0));
        assert_eq!(step_index(0, 3, false, false), None);
        assert_eq!(step_index(0, 3, false, true), Some(2));
        assert_eq!(step_index(0, 0, true, true), None);
    }

    #[tokio::test]
    async fn test_skip_emits_loading_then_ready() {
        let engine = LocalEngine::new(Duration::from_millis(10));
        engine.load_queue(queue()).await.unwrap();
        let mut rx = engine.subscribe();

        engine.skip("b").await.unwrap();

        match rx.recv().await.unwrap() {
            PlayerEvent::TrackChanged { track } => assert_eq!(track.id, "b"),
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(next_state(&mut rx).await, PlaybackState::Loading);
        assert_eq!(next_state(&mut rx).await, PlaybackState::Ready);
        assert_eq!(engine.state().await, PlaybackState::Ready);
    }

    #[tokio::test]
    async fn test_skip_while_playing_keeps_playing() {
        let engine = LocalEngine::new(Duration::from_millis(10));
        engine.load_queue(queue()).await.unwrap();
        engine.play().await.unwrap();
        let mut rx = engine.subscribe();

        engine.skip_to_next().await.unwrap();

        assert_eq!(next_state(&mut rx).await, PlaybackState::Loading);
        assert_eq!(next_state(&mut rx).await, PlaybackState::Playing);
        assert_eq!(engine.current_track().await.unwrap().id, "b");
    }

    #[tokio::test]
    async fn test_skip_unknown_track_fails() {
        let engine = LocalEngine::new(Duration::from_millis(10));
        engine.load_queue(queue()).await.unwrap();

        let err = engine.skip("zzz").await.unwrap_err();
        assert!(matches!(err, PlayerError::TrackNotFound(id) if id == "zzz"));
        assert_eq!(engine.current_track().await.unwrap().id, "a");
    }

    #[tokio::test]
    async fn test_newer_skip_supersedes_pending_load() {
        let engine = LocalEngine::new(Duration::from_millis(30));
        engine.load_queue(queue()).await.unwrap();

        engine.skip("b").await.unwrap();
        engine.skip("c").await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(engine.state().await, PlaybackState::Ready);
        assert_eq!(engine.current_track().await.unwrap().id, "c");
    }

    #[tokio::test]
    async fn test_next_and_previous_respect_repeat() {
        let engine = LocalEngine::new(Duration::from_millis(1));
        engine.load_queue(queue()).await.unwrap();

        assert!(matches!(engine.skip_to_previous().await, Err(PlayerError::EndOfQueue)));

        engine.set_repeat(RepeatState::All).await.unwrap();
        engine.skip_to_previous().await.unwrap();
        assert_eq!(engine.current_track().await.unwrap().id, "c");

        engine.skip_to_next().await.unwrap();
        assert_eq!(engine.current_track().await.unwrap().id, "a");
    }

    #[tokio::test]
    async fn test_shuffle_visits_every_track_once() {
        let engine = LocalEngine::new(Duration::from_millis(1));
        engine.load_queue(queue()).await.unwrap();
        engine.set_shuffle(true).await.unwrap();

        let mut seen = vec![engine.current_track().await.unwrap().id];
        while engine.skip_to_next().await.is_ok() {
            seen.push(engine.current_track().await.unwrap().id);
        }
        seen.sort();
        assert_eq!(seen, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_seek_clamps_to_duration() {
        let engine = LocalEngine::new(Duration::from_millis(1));
        engine.load_queue(queue()).await.unwrap();

        engine.seek_to(90_000).await.unwrap();
        assert_eq!(engine.position_ms().await, 60_000);

        engine.seek_to(0).await.unwrap();
        assert_eq!(engine.position_ms().await, 0);
    }

    #[tokio::test]
    async fn test_play_on_empty_queue_fails() {
        let engine = LocalEngine::new(Duration::from_millis(1));
        assert!(matches!(engine.play().await, Err(PlayerError::EmptyQueue)));
    }

    #[tokio::test]
    async fn test_pause_freezes_position() {
        let engine = LocalEngine::new(Duration::from_millis(1));
        engine.load_queue(queue()).await.unwrap();
        engine.seek_to(5_000).await.unwrap();
        engine.play().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        engine.pause().await.unwrap();

        let paused_at = engine.position_ms().await;
        assert!(paused_at >= 5_000);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(engine.position_ms().await, paused_at);
        assert_eq!(engine.state().await, PlaybackState::Paused);
    }
}
