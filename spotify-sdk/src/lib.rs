//! # spotify-sdk
//!
//! An embeddable coordination layer over a libspotify-style native
//! streaming client. The native library fires callbacks on a thread it
//! owns and reference-counts every object it hands out; this SDK turns
//! that into something a single-threaded embedder can drive:
//!
//! - an ordered, single-consumer event queue fed from the native thread,
//!   with coalesced tick wakeups for the library's pending-work poll;
//! - a session coordinator (login/logout, connection-state machine, link
//!   resolution, listener dispatch with a process-wide fallback);
//! - a player transport state machine (idle/playing/paused, optimistic
//!   seek, counters that reset exactly when a new track loads);
//! - paginated multi-category search with neutral-until-loaded accessors;
//! - RAII handle wrappers that make the native acquire/release pair
//!   impossible to unbalance.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use spotify_sdk::{SessionConfig, SessionEventKind, Spotify};
//!
//! let sdk = Arc::new(link_native_library());
//! let spotify = Spotify::new(SessionConfig::new(), sdk)?;
//!
//! spotify.session().on(SessionEventKind::LoginComplete, |event| {
//!     println!("login finished: {event:?}");
//! });
//! spotify.session().login("user", "password", true, false)?;
//!
//! // From the embedder's event loop:
//! loop {
//!     spotify.process_pending();
//!     # break;
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! spotify-sdk        (system object + event pump)
//!     ↓
//! spotify-session    (session / player / search coordination)
//!     ↓
//! spotify-bridge     (cross-thread event hand-off)
//!     ↓
//! spotify-native     (capability surface + handle lifetimes)
//! ```

// Main exports
pub use error::SdkError;
pub use options::{load_config, user_dirs_config};
pub use spotify::Spotify;

// Re-export the coordination and handle types embedders hold
pub use spotify_native::{
    Album, Artist, LinkType, NativeError, NativeEvent, NativeSdk, Playlist, SearchPage, Track,
};
pub use spotify_session::{
    clear_any_session, init_logging, init_logging_from_env, on_any_session, AudioSink,
    ConnectionState, LinkTarget, LoggingMode, Player, Search, SearchRegistry, Session,
    SessionConfig, SessionError, SessionEvent, SessionEventKind, TransportState,
};

#[cfg(feature = "test-support")]
pub use spotify_native::{MockSdk, MockSearchResults, PlayerCommand};

// Internal modules
mod error;
mod options;
mod relay;
mod spotify;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        ConnectionState, LinkTarget, Player, Search, Session, SessionConfig, SessionEvent,
        SessionEventKind, Spotify, TransportState,
    };
}
