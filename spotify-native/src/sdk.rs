//! The native client-library capability surface
//!
//! The streaming library itself is a black box: it owns the network
//! connection, the object graph, and an internal thread that fires
//! callbacks. This module defines the two traits that describe the
//! boundary:
//!
//! - [`NativeSdk`]: every call the coordination layer makes *into* the
//!   library (session, player, search, links, reference counting).
//! - [`NativeCallbacks`]: the sink the library pushes events *out* through,
//!   always from its own internal thread.
//!
//! Production builds implement [`NativeSdk`] over the linked library; tests
//! use the counting mock behind the `test-support` feature.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{NativeError, Result};
use crate::raw::{HandleKind, RawHandle};

/// Options handed to the native library at session creation.
///
/// Paths default to folders relative to the working directory; the trace
/// file is off unless set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Folder for persisted settings (stored credentials live here)
    pub settings_folder: PathBuf,
    /// Folder for the library's content cache
    pub cache_folder: PathBuf,
    /// Optional API trace log file
    pub trace_file: Option<PathBuf>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            settings_folder: PathBuf::from("settings"),
            cache_folder: PathBuf::from("cache"),
            trace_file: None,
        }
    }
}

/// One category's pagination window for a search request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchPage {
    pub offset: u32,
    pub limit: u32,
}

impl SearchPage {
    pub fn new(offset: u32, limit: u32) -> Self {
        Self { offset, limit }
    }
}

impl Default for SearchPage {
    /// First page of ten results
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 10,
        }
    }
}

/// Native search type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    /// Full search across all categories
    Standard,
    /// Suggestion search (as-you-type)
    Suggest,
}

/// Category of object a parsed link points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    Track,
    Album,
    Artist,
    Playlist,
    Search,
    /// Any other (or unrecognized) link type
    Other,
}

/// An event pushed by the native library's internal thread.
///
/// Events carry raw handles, never wrappers: ownership decisions (adopt vs
/// acquire) are made by the consumer-side code that unpacks them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeEvent {
    /// Login attempt finished; `error` is `None` on success
    LoggedIn { error: Option<NativeError> },
    /// Session was logged out (explicit logout or fatal failure)
    LoggedOut,
    /// Connection-level failure on an established session
    ConnectionError { error: NativeError },
    /// A previously lost connection was re-established
    ConnectionRestored,
    /// Metadata for previously unloaded objects became available
    MetadataUpdated,
    /// The library wants `process_events` called as soon as possible
    NotifyMainThread,
    /// A search finished loading (success or definitively empty)
    SearchComplete { search: RawHandle },
    /// Audio pipeline progress: current second and cumulative frame count
    PlaybackProgress { second: u32, frames: u64 },
    /// The current track played to its end
    EndOfTrack,
    /// Playback was started elsewhere on the same account
    PlayTokenLost,
}

/// Sink for events pushed from the native library's internal thread.
///
/// Implementations must be cheap and non-blocking: the library's thread is
/// on the other side and stalls the whole session if held up. The intended
/// implementation enqueues onto the event bridge and returns.
pub trait NativeCallbacks: Send + Sync {
    fn notify(&self, event: NativeEvent);
}

impl<F> NativeCallbacks for F
where
    F: Fn(NativeEvent) + Send + Sync,
{
    fn notify(&self, event: NativeEvent) {
        self(event)
    }
}

/// Every call the coordination layer makes into the native library.
///
/// One session exists per process; session-scoped calls implicitly target
/// it. Methods that hand back a [`RawHandle`] document whether the
/// reference is owned (caller must release) or borrowed (caller must
/// acquire before keeping it); getting this wrong is exactly the class of
/// bug the wrapper layer exists to prevent.
pub trait NativeSdk: Send + Sync {
    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    /// Create the process-wide session.
    ///
    /// `callbacks` is retained by the library and invoked from its internal
    /// thread for the rest of the session's life.
    fn session_create(
        &self,
        options: &SessionOptions,
        callbacks: Arc<dyn NativeCallbacks>,
    ) -> Result<()>;

    /// Begin an asynchronous login. Completion arrives as
    /// [`NativeEvent::LoggedIn`].
    fn login(&self, username: &str, password: &str, remember_me: bool) -> Result<()>;

    /// Begin an asynchronous login with credentials stored from a previous
    /// `remember_me` login.
    fn relogin(&self) -> Result<()>;

    /// Begin an asynchronous logout. Completion arrives as
    /// [`NativeEvent::LoggedOut`].
    fn logout(&self);

    /// Discard stored credentials
    fn forget_me(&self);

    /// Username remembered from the last `remember_me` login, if any
    fn remembered_user(&self) -> Option<String>;

    /// Run the library's pending work. Returns how long the caller may wait
    /// before the next call is due.
    fn process_events(&self) -> Duration;

    // ------------------------------------------------------------------
    // Player
    // ------------------------------------------------------------------

    /// Load a track into the player. Fails if the track is not playable.
    fn player_load(&self, track: RawHandle) -> Result<()>;

    /// Start (`true`) or stop (`false`) frame production
    fn player_play(&self, play: bool);

    /// Reposition playback, in milliseconds
    fn player_seek(&self, position_ms: u32);

    /// Unload the current track
    fn player_unload(&self);

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    /// Issue a search. The returned handle is an **owned** reference to the
    /// in-flight search object; completion arrives as
    /// [`NativeEvent::SearchComplete`] carrying the same handle.
    #[allow(clippy::too_many_arguments)]
    fn search_create(
        &self,
        query: &str,
        tracks: SearchPage,
        albums: SearchPage,
        artists: SearchPage,
        playlists: SearchPage,
        kind: SearchKind,
    ) -> RawHandle;

    fn search_is_loaded(&self, search: RawHandle) -> bool;

    /// Number of items returned for a category (`Track`, `Album`, `Artist`
    /// or `Playlist`)
    fn search_num(&self, search: RawHandle, kind: HandleKind) -> u32;

    /// Item at `index` within a category. **Borrowed** reference.
    fn search_item(&self, search: RawHandle, kind: HandleKind, index: u32) -> RawHandle;

    /// Server-side total for a category; may exceed the returned page
    fn search_total(&self, search: RawHandle, kind: HandleKind) -> u32;

    /// Suggested spelling correction, empty if none
    fn search_did_you_mean(&self, search: RawHandle) -> String;

    // ------------------------------------------------------------------
    // Links
    // ------------------------------------------------------------------

    /// Parse a canonical link string. Returns an **owned** reference, or
    /// null if the string is not a recognizable link.
    fn link_create(&self, uri: &str) -> RawHandle;

    fn link_type(&self, link: RawHandle) -> LinkType;

    /// The media object a track/album/artist link points at. **Borrowed**
    /// reference; null for other link types.
    fn link_as_media(&self, link: RawHandle) -> RawHandle;

    /// Build a link for a loaded search. **Owned** reference.
    fn link_from_search(&self, search: RawHandle) -> RawHandle;

    /// Canonical string form of a link
    fn link_as_string(&self, link: RawHandle) -> String;

    // ------------------------------------------------------------------
    // Reference counting and object queries
    // ------------------------------------------------------------------

    /// Add one reference to a native object
    fn media_add_ref(&self, kind: HandleKind, raw: RawHandle);

    /// Release one reference to a native object
    fn media_release(&self, kind: HandleKind, raw: RawHandle);

    fn media_is_loaded(&self, kind: HandleKind, raw: RawHandle) -> bool;

    /// Display name of an object; empty until loaded
    fn media_name(&self, kind: HandleKind, raw: RawHandle) -> String;

    // ------------------------------------------------------------------
    // Playlist container
    // ------------------------------------------------------------------

    /// Playlists of the logged-in user. **Borrowed** references.
    fn playlist_container(&self) -> Vec<RawHandle>;

    /// The user's starred-tracks playlist. **Borrowed** reference.
    fn starred_playlist(&self) -> RawHandle;
}
