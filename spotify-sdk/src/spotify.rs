//! The system object
//!
//! [`Spotify`] wires the pieces together over one native session: the
//! event bridge and its tick worker, the session coordinator, the player,
//! and the search completion registry. It also owns the consumer side of
//! the bridge; the embedder calls [`process_pending`](Spotify::process_pending)
//! (or [`pump_one`](Spotify::pump_one)) from its event loop, and that pass
//! is the only place shared state is mutated.

use std::sync::Arc;
use std::time::Duration;

use spotify_bridge::{BridgeIterator, BridgeMessage, EventBridge, TickWorker};
use spotify_native::{NativeEvent, NativeSdk};
use spotify_session::{
    AudioSink, Player, Search, SearchRegistry, Session, SessionConfig, SessionEvent,
};

use crate::error::SdkError;
use crate::relay::CallbackRelay;

/// Floor for the native layer's requested poll timeout; it occasionally
/// asks for zero, which would spin.
const MIN_TICK: Duration = Duration::from_millis(10);

/// The assembled SDK over one native session
pub struct Spotify {
    sdk: Arc<dyn NativeSdk>,
    iter: BridgeIterator<NativeEvent>,
    ticker: TickWorker,
    session: Session,
    player: Player,
    searches: SearchRegistry,
}

impl Spotify {
    /// Create the native session and start the tick worker.
    ///
    /// The session callbacks are installed before the native session
    /// starts delivering events, so nothing can fire into an unwired
    /// bridge.
    pub fn new(config: SessionConfig, sdk: Arc<dyn NativeSdk>) -> Result<Self, SdkError> {
        config.validate()?;

        let bridge = EventBridge::new();
        let relay = Arc::new(CallbackRelay::new(bridge.handle()));
        sdk.session_create(&config.to_options(), relay)?;

        let ticker = TickWorker::spawn(config.tick_interval(), bridge.handle())?;

        tracing::info!(
            settings = %config.settings_folder.display(),
            cache = %config.cache_folder.display(),
            "session created"
        );

        Ok(Self {
            iter: bridge.iter(),
            session: Session::new(Arc::clone(&sdk)),
            player: Player::new(Arc::clone(&sdk)),
            searches: SearchRegistry::new(),
            sdk,
            ticker,
        })
    }

    /// Attach the audio sink flushed on pause. Call before handing the
    /// player out.
    pub fn with_sink(mut self, sink: Arc<dyn AudioSink>) -> Self {
        self.player = self.player.with_sink(sink);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// The native capability surface, for constructing further request
    /// objects against the same session
    pub fn native(&self) -> Arc<dyn NativeSdk> {
        Arc::clone(&self.sdk)
    }

    /// A search over this session with default pagination
    pub fn search(&self, query: impl Into<String>) -> Search {
        Search::new(Arc::clone(&self.sdk), query)
    }

    /// Issue a search and register its completion callback.
    ///
    /// The callback fires exactly once, during a later event pass, when
    /// the native layer reports the search loaded.
    pub fn execute_search<F>(&self, search: &mut Search, on_complete: F) -> Result<(), SdkError>
    where
        F: FnOnce() + Send + 'static,
    {
        search.execute(&self.searches, on_complete)?;
        Ok(())
    }

    /// Completion registry for in-flight searches
    pub fn search_registry(&self) -> &SearchRegistry {
        &self.searches
    }

    /// Drain everything currently queued on the bridge.
    ///
    /// This is the embedding loop's native-callback pass. Returns the
    /// number of messages handled.
    pub fn process_pending(&self) -> usize {
        let mut handled = 0;
        while let Some(message) = self.iter.try_recv() {
            self.route(message);
            handled += 1;
        }
        handled
    }

    /// Wait up to `timeout` for one message and handle it.
    ///
    /// For embedders without their own wakeup integration: loop over this
    /// from the consumer thread.
    pub fn pump_one(&self, timeout: Duration) -> bool {
        match self.iter.recv_timeout(timeout) {
            Some(message) => {
                self.route(message);
                true
            }
            None => false,
        }
    }

    fn route(&self, message: BridgeMessage<NativeEvent>) {
        match message {
            BridgeMessage::Tick => {
                let next = self.sdk.process_events();
                // The native layer says when it next wants polling
                let _ = self.ticker.set_interval(next.max(MIN_TICK));
            }
            BridgeMessage::Event(event) => self.route_event(event),
        }
    }

    fn route_event(&self, event: NativeEvent) {
        match event {
            NativeEvent::LoggedIn { error } => {
                self.session
                    .handle_event(&SessionEvent::LoginComplete { error });
            }
            NativeEvent::LoggedOut => {
                self.session.handle_event(&SessionEvent::LoggedOut);
            }
            NativeEvent::ConnectionError { error } => {
                self.session
                    .handle_event(&SessionEvent::ConnectionLost { error });
            }
            NativeEvent::ConnectionRestored => {
                self.session.handle_event(&SessionEvent::ConnectionRestored);
            }
            NativeEvent::MetadataUpdated => {
                self.session.handle_event(&SessionEvent::MetadataUpdated);
            }
            NativeEvent::SearchComplete { search } => {
                self.searches.complete(search);
            }
            NativeEvent::PlaybackProgress { second, frames } => {
                self.player.on_progress(second, frames);
            }
            NativeEvent::EndOfTrack => {
                self.session.handle_event(&SessionEvent::EndOfTrack);
            }
            NativeEvent::PlayTokenLost => {
                self.session.handle_event(&SessionEvent::PlayTokenLost);
            }
            // The relay turns these into ticks; if one slips through as an
            // event, treat it the same way
            NativeEvent::NotifyMainThread => {
                let _ = self.sdk.process_events();
            }
        }
    }

    /// Stop the tick worker. Also happens when the value drops.
    pub fn shutdown(&self) {
        self.ticker.shutdown();
    }
}

impl std::fmt::Debug for Spotify {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spotify")
            .field("state", &self.session.connection_state())
            .field("pending_searches", &self.searches.pending_count())
            .finish()
    }
}
