//! Session coordination
//!
//! Owns the connection-state machine around the single native session and
//! resolves canonical links into typed handles. Login and logout are
//! asynchronous: the calls here only issue the request, and outcomes
//! arrive as [`SessionEvent`]s on the consumer thread, where
//! [`Session::handle_event`] advances the state machine and dispatches to
//! listeners.

use std::sync::Arc;

use parking_lot::Mutex;

use spotify_native::{Album, Artist, LinkRef, LinkType, NativeSdk, Playlist, Track};

use crate::error::{Result, SessionError};
use crate::events::{ConnectionState, SessionEvent, SessionEventKind};
use crate::listener::ListenerRegistry;

/// What a canonical link resolved to.
///
/// Playlist and search links resolve to `None`: link-type coverage is
/// intentionally partial, and unsupported types are an empty result, not
/// an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    Track(Track),
    Album(Album),
    Artist(Artist),
    None,
}

impl LinkTarget {
    pub fn is_none(&self) -> bool {
        matches!(self, LinkTarget::None)
    }
}

/// The session coordinator. One exists per process, for the lifetime of
/// the process.
pub struct Session {
    sdk: Arc<dyn NativeSdk>,
    state: Mutex<ConnectionState>,
    listeners: ListenerRegistry,
}

impl Session {
    pub fn new(sdk: Arc<dyn NativeSdk>) -> Self {
        Self {
            sdk,
            state: Mutex::new(ConnectionState::Disconnected),
            listeners: ListenerRegistry::new(),
        }
    }

    /// Begin an asynchronous login.
    ///
    /// With `use_stored` set, credentials remembered from a previous
    /// `remember_me` login are used and `username`/`password` are ignored.
    /// The outcome arrives as [`SessionEvent::LoginComplete`]; the only
    /// synchronous failures are a login already in flight and an outright
    /// rejection by the native layer.
    pub fn login(
        &self,
        username: &str,
        password: &str,
        remember_me: bool,
        use_stored: bool,
    ) -> Result<()> {
        let mut state = self.state.lock();
        if *state == ConnectionState::Connecting {
            return Err(SessionError::LoginInProgress);
        }

        if use_stored {
            self.sdk.relogin()?;
        } else {
            self.sdk.login(username, password, remember_me)?;
        }

        *state = ConnectionState::Connecting;
        tracing::info!(use_stored, "login issued");
        Ok(())
    }

    /// Begin an asynchronous logout. Completion arrives as
    /// [`SessionEvent::LoggedOut`].
    pub fn logout(&self) {
        tracing::info!("logout issued");
        self.sdk.logout();
    }

    /// Discard credentials stored by a `remember_me` login
    pub fn forget_me(&self) {
        self.sdk.forget_me();
    }

    /// Username remembered from the last `remember_me` login, empty if
    /// none
    pub fn remembered_user(&self) -> String {
        self.sdk.remembered_user().unwrap_or_default()
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.state.lock()
    }

    /// Register a listener for a session event kind on this session.
    ///
    /// Takes precedence over any process-wide fallback registered through
    /// [`on_any_session`](crate::listener::on_any_session).
    pub fn on<F>(&self, kind: SessionEventKind, callback: F)
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.listeners.on(kind, callback);
    }

    /// Remove a listener registered with [`on`](Session::on)
    pub fn off(&self, kind: SessionEventKind) {
        self.listeners.off(kind);
    }

    /// Resolve a canonical link string to a typed handle.
    ///
    /// Track, album and artist links resolve; playlist and search links,
    /// unrecognized types, and unparseable strings yield
    /// [`LinkTarget::None`]. The intermediate native link object is
    /// released exactly once on every path.
    pub fn create_from_link(&self, uri: &str) -> LinkTarget {
        // Adopting the owned parse result guarantees the release
        let link = LinkRef::adopt(Arc::clone(&self.sdk), self.sdk.link_create(uri));
        if link.is_empty() {
            tracing::debug!(uri, "link did not parse");
            return LinkTarget::None;
        }

        let media = self.sdk.link_as_media(link.raw());
        match self.sdk.link_type(link.raw()) {
            LinkType::Track => LinkTarget::Track(Track::acquire(Arc::clone(&self.sdk), media)),
            LinkType::Album => LinkTarget::Album(Album::acquire(Arc::clone(&self.sdk), media)),
            LinkType::Artist => LinkTarget::Artist(Artist::acquire(Arc::clone(&self.sdk), media)),
            other => {
                tracing::debug!(uri, ?other, "unsupported link type");
                LinkTarget::None
            }
        }
    }

    /// Playlists of the logged-in user
    pub fn playlists(&self) -> Vec<Playlist> {
        self.sdk
            .playlist_container()
            .into_iter()
            .map(|raw| Playlist::acquire(Arc::clone(&self.sdk), raw))
            .collect()
    }

    /// The user's starred-tracks playlist; empty when not available
    pub fn starred(&self) -> Playlist {
        Playlist::acquire(Arc::clone(&self.sdk), self.sdk.starred_playlist())
    }

    /// Advance the state machine for an event and dispatch it to
    /// listeners. Runs on the consumer thread.
    pub fn handle_event(&self, event: &SessionEvent) {
        {
            let mut state = self.state.lock();
            let next = match event {
                SessionEvent::LoginComplete { error: None } => Some(ConnectionState::LoggedIn),
                SessionEvent::LoginComplete { error: Some(e) } => {
                    tracing::warn!(error = %e, "login failed");
                    Some(ConnectionState::Disconnected)
                }
                SessionEvent::LoggedOut => Some(ConnectionState::LoggedOut),
                SessionEvent::ConnectionLost { error } => {
                    if error.is_transient() {
                        tracing::warn!(error = %error, "connection lost, awaiting recovery");
                        Some(ConnectionState::ConnectionLost)
                    } else {
                        tracing::warn!(error = %error, "connection terminated");
                        Some(ConnectionState::Disconnected)
                    }
                }
                SessionEvent::ConnectionRestored => {
                    // Only meaningful while in the lost state
                    (*state == ConnectionState::ConnectionLost).then_some(ConnectionState::LoggedIn)
                }
                _ => None,
            };
            if let Some(next) = next {
                let from = *state;
                tracing::debug!(?from, to = ?next, "connection state");
                *state = next;
            }
        }

        self.listeners.dispatch(event);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.connection_state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use spotify_native::{HandleKind, MockSdk, NativeError};

    fn session() -> (Arc<MockSdk>, Session) {
        let mock = Arc::new(MockSdk::new());
        let sdk: Arc<dyn NativeSdk> = mock.clone();
        let callbacks: Arc<dyn spotify_native::NativeCallbacks> =
            Arc::new(|_: spotify_native::NativeEvent| {});
        sdk.session_create(&spotify_native::SessionOptions::default(), callbacks)
            .unwrap();
        (mock, Session::new(sdk))
    }

    #[test]
    fn test_login_state_machine() {
        let (_mock, session) = session();
        assert_eq!(session.connection_state(), ConnectionState::Disconnected);

        session.login("user", "pass", false, false).unwrap();
        assert_eq!(session.connection_state(), ConnectionState::Connecting);

        session.handle_event(&SessionEvent::LoginComplete { error: None });
        assert_eq!(session.connection_state(), ConnectionState::LoggedIn);
    }

    #[test]
    fn test_login_while_connecting_is_rejected() {
        let (_mock, session) = session();
        session.login("user", "pass", false, false).unwrap();

        let err = session.login("user", "pass", false, false).unwrap_err();
        assert!(matches!(err, SessionError::LoginInProgress));
    }

    #[test]
    fn test_failed_login_returns_to_disconnected() {
        let (_mock, session) = session();
        session.login("user", "wrong", false, false).unwrap();

        session.handle_event(&SessionEvent::LoginComplete {
            error: Some(NativeError::BadCredentials),
        });
        assert_eq!(session.connection_state(), ConnectionState::Disconnected);

        // A fresh attempt is allowed after the failure
        assert!(session.login("user", "pass", false, false).is_ok());
    }

    #[test]
    fn test_transient_loss_recovers() {
        let (_mock, session) = session();
        session.login("user", "pass", false, false).unwrap();
        session.handle_event(&SessionEvent::LoginComplete { error: None });

        session.handle_event(&SessionEvent::ConnectionLost {
            error: NativeError::NetworkDisabled,
        });
        assert_eq!(session.connection_state(), ConnectionState::ConnectionLost);

        session.handle_event(&SessionEvent::ConnectionRestored);
        assert_eq!(session.connection_state(), ConnectionState::LoggedIn);
    }

    #[test]
    fn test_fatal_loss_disconnects() {
        let (_mock, session) = session();
        session.login("user", "pass", false, false).unwrap();
        session.handle_event(&SessionEvent::LoginComplete { error: None });

        session.handle_event(&SessionEvent::ConnectionLost {
            error: NativeError::UserBanned,
        });
        assert_eq!(session.connection_state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_logout_event_reaches_listener() {
        let (_mock, session) = session();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_inner = Arc::clone(&hits);
        session.on(SessionEventKind::LoggedOut, move |_| {
            hits_inner.fetch_add(1, Ordering::SeqCst);
        });

        session.handle_event(&SessionEvent::LoggedOut);
        assert_eq!(session.connection_state(), ConnectionState::LoggedOut);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_use_stored_credentials() {
        let (mock, session) = session();
        session.login("trumpet", "secret", true, false).unwrap();
        mock.complete_login(Ok(()));
        session.handle_event(&SessionEvent::LoginComplete { error: None });
        assert_eq!(session.remembered_user(), "trumpet");

        // Relogin path uses the stored credentials
        session.handle_event(&SessionEvent::LoggedOut);
        session.login("", "", false, true).unwrap();
        assert_eq!(session.connection_state(), ConnectionState::Connecting);
    }

    #[test]
    fn test_relogin_without_credentials_fails() {
        let (_mock, session) = session();
        let err = session.login("", "", false, true).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Native(NativeError::NoCredentials)
        ));
        // The failed issue leaves the state untouched
        assert_eq!(session.connection_state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_create_from_link_track() {
        let (mock, session) = session();
        mock.register_media(HandleKind::Track, "So What", Some("spotify:track:sowhat"));

        match session.create_from_link("spotify:track:sowhat") {
            LinkTarget::Track(track) => assert_eq!(track.name(), "So What"),
            other => panic!("expected track, got {other:?}"),
        }
    }

    #[test]
    fn test_create_from_link_unsupported_and_malformed() {
        let (mock, session) = session();
        mock.register_media(
            HandleKind::Playlist,
            "Road Trip",
            Some("spotify:user:x:playlist:road"),
        );

        assert!(session
            .create_from_link("spotify:user:x:playlist:road")
            .is_none());
        assert!(session.create_from_link("spotify:search:miles").is_none());
        assert!(session.create_from_link("not a link at all").is_none());
    }

    #[test]
    fn test_link_released_exactly_once_on_every_path() {
        let (mock, session) = session();
        let track_raw =
            mock.register_media(HandleKind::Track, "So What", Some("spotify:track:sowhat"));

        let resolved = session.create_from_link("spotify:track:sowhat");
        let _ = session.create_from_link("spotify:search:miles");
        let _ = session.create_from_link("garbage");
        drop(resolved);

        // Every parsed link was released; the track handle balanced too
        assert!(mock.is_balanced());
        assert_eq!(mock.double_releases(), 0);
        let (acquired, released) = mock.ref_counts(HandleKind::Track, track_raw);
        assert_eq!(acquired, released);
        assert!(acquired > 0);
    }

    #[test]
    fn test_playlist_container_acquires() {
        let (mock, session) = session();
        let p1 = mock.register_media(HandleKind::Playlist, "Jazz", None);
        let p2 = mock.register_media(HandleKind::Playlist, "Focus", None);
        mock.set_playlists(vec![p1, p2]);
        mock.set_starred(p1);

        {
            let playlists = session.playlists();
            assert_eq!(playlists.len(), 2);
            assert_eq!(playlists[0].name(), "Jazz");
            let starred = session.starred();
            assert_eq!(starred.name(), "Jazz");
        }
        assert!(mock.is_balanced());
    }
}
