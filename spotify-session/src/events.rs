//! Session-level events and connection state

use spotify_native::NativeError;

/// Connection state of the native session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No connection; nothing attempted yet or a login failed
    #[default]
    Disconnected,
    /// A login is in flight
    Connecting,
    /// Logged in with a live connection
    LoggedIn,
    /// The session was explicitly logged out (or terminated by the server)
    LoggedOut,
    /// Transient network loss on an established session; the native layer
    /// reconnects on its own
    ConnectionLost,
}

/// An event dispatched to session listeners.
///
/// These are the session-scoped subset of native events: search
/// completions go to the per-search completion callbacks and playback
/// progress goes to the player, not through here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A login attempt finished; `error` is `None` on success
    LoginComplete { error: Option<NativeError> },
    /// The session was logged out
    LoggedOut,
    /// Connection-level failure on an established session
    ConnectionLost { error: NativeError },
    /// A previously lost connection came back
    ConnectionRestored,
    /// Metadata for previously unloaded objects became available
    MetadataUpdated,
    /// The current track played to its end
    EndOfTrack,
    /// Playback was started elsewhere on the same account
    PlayTokenLost,
}

/// Lookup key for listener registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEventKind {
    LoginComplete,
    LoggedOut,
    ConnectionLost,
    ConnectionRestored,
    MetadataUpdated,
    EndOfTrack,
    PlayTokenLost,
}

impl SessionEvent {
    pub fn kind(&self) -> SessionEventKind {
        match self {
            SessionEvent::LoginComplete { .. } => SessionEventKind::LoginComplete,
            SessionEvent::LoggedOut => SessionEventKind::LoggedOut,
            SessionEvent::ConnectionLost { .. } => SessionEventKind::ConnectionLost,
            SessionEvent::ConnectionRestored => SessionEventKind::ConnectionRestored,
            SessionEvent::MetadataUpdated => SessionEventKind::MetadataUpdated,
            SessionEvent::EndOfTrack => SessionEventKind::EndOfTrack,
            SessionEvent::PlayTokenLost => SessionEventKind::PlayTokenLost,
        }
    }
}
