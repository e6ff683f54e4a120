//! Player transport state machine
//!
//! Tracks the transport state (idle/playing/paused) and the playback
//! counters against a single active track, and issues the corresponding
//! commands to the native player. All mutation happens on the consumer
//! thread; progress reported by the audio pipeline updates the counters
//! but never the transport state.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use spotify_native::{NativeSdk, Track};

use crate::error::Result;

/// Transport state of the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransportState {
    /// No track loaded
    #[default]
    Idle,
    /// Producing frames
    Playing,
    /// Track loaded, frame production stopped
    Paused,
}

/// Sink for decoded audio, owned by the embedder.
///
/// The player only needs one operation from it: dropping whatever is
/// buffered when playback pauses, so stale audio does not play on resume.
pub trait AudioSink: Send + Sync {
    fn flush(&self);
}

#[derive(Default)]
struct PlayerState {
    transport: TransportState,
    current_track: Option<Track>,
    elapsed_seconds: u32,
    frames_received: u64,
}

/// The player.
///
/// Cheap to clone; clones share state. One exists per session.
#[derive(Clone)]
pub struct Player {
    sdk: Arc<dyn NativeSdk>,
    state: Arc<Mutex<PlayerState>>,
    sink: Option<Arc<dyn AudioSink>>,
}

impl Player {
    pub fn new(sdk: Arc<dyn NativeSdk>) -> Self {
        Self {
            sdk,
            state: Arc::new(Mutex::new(PlayerState::default())),
            sink: None,
        }
    }

    /// Attach the audio sink to flush on pause
    pub fn with_sink(mut self, sink: Arc<dyn AudioSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Load a track and start playback.
    ///
    /// Works from any prior state; both playback counters reset to zero
    /// when the new track begins loading. On a load failure (e.g. the
    /// track is not playable) the previous transport state is kept and the
    /// error is returned.
    pub fn play(&self, track: &Track) -> Result<()> {
        let mut state = self.state.lock();
        state.elapsed_seconds = 0;
        state.frames_received = 0;

        self.sdk.player_load(track.raw())?;
        self.sdk.player_play(true);

        state.transport = TransportState::Playing;
        state.current_track = Some(track.clone());
        tracing::debug!(track = %track.name(), "playback started");
        Ok(())
    }

    /// Stop frame production and flush buffered audio.
    ///
    /// Only meaningful while playing; otherwise a no-op. Counters keep
    /// their values so resume continues where pause left off.
    pub fn pause(&self) {
        let mut state = self.state.lock();
        if state.transport != TransportState::Playing {
            return;
        }
        self.sdk.player_play(false);
        if let Some(sink) = &self.sink {
            sink.flush();
        }
        state.transport = TransportState::Paused;
        tracing::debug!(second = state.elapsed_seconds, "playback paused");
    }

    /// Resume frame production. A no-op unless currently paused.
    pub fn resume(&self) {
        let mut state = self.state.lock();
        if state.transport != TransportState::Paused {
            return;
        }
        self.sdk.player_play(true);
        state.transport = TransportState::Playing;
        tracing::debug!(second = state.elapsed_seconds, "playback resumed");
    }

    /// Unload the current track
    pub fn stop(&self) {
        let mut state = self.state.lock();
        self.sdk.player_unload();
        state.transport = TransportState::Idle;
        state.current_track = None;
        tracing::debug!("playback stopped");
    }

    /// Reposition playback to the given second.
    ///
    /// The elapsed-seconds counter is updated immediately, before the
    /// native layer confirms; the next progress report corrects it if the
    /// native layer clamped the position. Range checking is the native
    /// layer's job.
    pub fn seek(&self, second: u32) {
        self.sdk.player_seek(second * 1000);
        self.state.lock().elapsed_seconds = second;
    }

    pub fn state(&self) -> TransportState {
        self.state.lock().transport
    }

    /// Seconds of the current track played so far
    pub fn current_second(&self) -> u32 {
        self.state.lock().elapsed_seconds
    }

    /// Frames delivered by the audio pipeline for the current track
    pub fn frames_received(&self) -> u64 {
        self.state.lock().frames_received
    }

    pub fn current_track(&self) -> Option<Track> {
        self.state.lock().current_track.clone()
    }

    /// Apply a progress report from the audio pipeline.
    ///
    /// Updates the counters only; the transport state is owned by the
    /// command methods.
    pub fn on_progress(&self, second: u32, frames: u64) {
        let mut state = self.state.lock();
        state.elapsed_seconds = second;
        state.frames_received = frames;
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Player")
            .field("transport", &state.transport)
            .field("elapsed_seconds", &state.elapsed_seconds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use spotify_native::{HandleKind, MockSdk, PlayerCommand};

    struct CountingSink(AtomicUsize);

    impl AudioSink for CountingSink {
        fn flush(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn player_with_track() -> (Arc<MockSdk>, Player, Track) {
        let mock = Arc::new(MockSdk::new());
        let raw = mock.register_media(HandleKind::Track, "So What", None);
        let sdk: Arc<dyn NativeSdk> = mock.clone();
        let track = Track::acquire(Arc::clone(&sdk), raw);
        (mock, Player::new(sdk), track)
    }

    #[test]
    fn test_play_resets_counters_from_any_state() {
        let (_mock, player, track) = player_with_track();

        player.play(&track).unwrap();
        player.on_progress(42, 1_852_200);
        assert_eq!(player.current_second(), 42);

        // Replaying resets both counters, also from paused
        player.pause();
        player.play(&track).unwrap();
        assert_eq!(player.current_second(), 0);
        assert_eq!(player.frames_received(), 0);
        assert_eq!(player.state(), TransportState::Playing);
    }

    #[test]
    fn test_resume_only_from_paused() {
        let (mock, player, track) = player_with_track();

        // Resume while idle: no command, no state change
        player.resume();
        assert_eq!(player.state(), TransportState::Idle);
        assert!(mock.player_commands().is_empty());

        player.play(&track).unwrap();
        player.on_progress(10, 441_000);

        // Resume while playing: no-op, counters untouched
        player.resume();
        assert_eq!(player.current_second(), 10);

        player.pause();
        assert_eq!(player.state(), TransportState::Paused);
        player.resume();
        assert_eq!(player.state(), TransportState::Playing);
        // Counters survived the pause/resume pair
        assert_eq!(player.current_second(), 10);
        assert_eq!(player.frames_received(), 441_000);
    }

    #[test]
    fn test_pause_flushes_sink() {
        let (_mock, player, track) = player_with_track();
        let sink = Arc::new(CountingSink(AtomicUsize::new(0)));
        let player = player.with_sink(sink.clone());

        player.play(&track).unwrap();
        player.pause();
        assert_eq!(sink.0.load(Ordering::SeqCst), 1);

        // Pause while paused does not flush again
        player.pause();
        assert_eq!(sink.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_seek_is_optimistic() {
        let (mock, player, track) = player_with_track();
        player.play(&track).unwrap();

        player.seek(30);
        // Updated immediately, before any confirmation arrives
        assert_eq!(player.current_second(), 30);
        assert!(mock
            .player_commands()
            .contains(&PlayerCommand::Seek(30_000)));
    }

    #[test]
    fn test_stop_unloads_and_clears_track() {
        let (mock, player, track) = player_with_track();
        player.play(&track).unwrap();
        assert!(player.current_track().is_some());

        player.stop();
        assert_eq!(player.state(), TransportState::Idle);
        assert!(player.current_track().is_none());
        assert_eq!(
            mock.player_commands().last(),
            Some(&PlayerCommand::Unload)
        );
    }

    #[test]
    fn test_progress_never_changes_transport() {
        let (_mock, player, track) = player_with_track();
        player.play(&track).unwrap();
        player.pause();

        player.on_progress(99, 1);
        assert_eq!(player.state(), TransportState::Paused);
        assert_eq!(player.current_second(), 99);
    }

    #[test]
    fn test_failed_load_keeps_state() {
        let (mock, player, _track) = player_with_track();
        let bad_raw = mock.register_media(HandleKind::Track, "Unplayable", None);
        mock.set_unplayable(bad_raw);
        let sdk: Arc<dyn NativeSdk> = mock.clone();
        let bad = Track::acquire(sdk, bad_raw);

        assert!(player.play(&bad).is_err());
        assert_eq!(player.state(), TransportState::Idle);
        assert!(player.current_track().is_none());
    }
}
