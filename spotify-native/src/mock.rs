//! Counting mock of the native library, for tests
//!
//! `MockSdk` implements the full [`NativeSdk`] surface over in-memory
//! fixtures and keeps a per-object ledger of references acquired and
//! released, so tests can assert that wrapper lifetimes balance exactly:
//! no leak, no double release.
//!
//! Asynchronous completions are driven explicitly: [`MockSdk::complete_login`]
//! and [`MockSdk::complete_search`] fire the registered callbacks, and
//! [`MockSdk::emit`] pushes any event. Callbacks run on the calling thread;
//! tests that care about the cross-thread path call these from a spawned
//! thread, standing in for the library's internal one.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};

use crate::error::{NativeError, Result};
use crate::raw::{HandleKind, RawHandle};
use crate::sdk::{
    LinkType, NativeCallbacks, NativeEvent, NativeSdk, SearchKind, SearchPage, SessionOptions,
};

/// A player command observed by the mock, in issue order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCommand {
    Load(RawHandle),
    Play,
    Stop,
    Seek(u32),
    Unload,
}

/// Canned results for a search, installed via [`MockSdk::complete_search`]
#[derive(Debug, Clone, Default)]
pub struct MockSearchResults {
    pub tracks: Vec<RawHandle>,
    pub albums: Vec<RawHandle>,
    pub artists: Vec<RawHandle>,
    pub playlists: Vec<RawHandle>,
    pub total_tracks: u32,
    pub total_albums: u32,
    pub total_artists: u32,
    pub total_playlists: u32,
    pub did_you_mean: String,
}

/// The eight pagination parameters and type of an issued search, as the
/// mock observed them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequestRecord {
    pub query: String,
    pub tracks: SearchPage,
    pub albums: SearchPage,
    pub artists: SearchPage,
    pub playlists: SearchPage,
    pub kind: SearchKind,
}

#[derive(Debug, Default, Clone, Copy)]
struct Counts {
    acquired: u64,
    released: u64,
}

struct MockObject {
    kind: HandleKind,
    name: String,
    loaded: bool,
    playable: bool,
}

struct MockLink {
    link_type: LinkType,
    target: RawHandle,
    text: String,
}

struct MockSearch {
    request: SearchRequestRecord,
    loaded: bool,
    results: MockSearchResults,
}

#[derive(Default)]
struct MockState {
    next_raw: u64,
    counts: HashMap<(HandleKind, RawHandle), Counts>,
    double_releases: u64,
    objects: HashMap<RawHandle, MockObject>,
    uris: HashMap<String, RawHandle>,
    links: HashMap<RawHandle, MockLink>,
    searches: HashMap<RawHandle, MockSearch>,
    player_commands: Vec<PlayerCommand>,
    session_created: bool,
    last_login: Option<(String, bool)>,
    remembered_user: Option<String>,
    playlists: Vec<RawHandle>,
    starred: RawHandle,
    process_events_calls: u64,
}

/// In-memory stand-in for the native library
pub struct MockSdk {
    state: Mutex<MockState>,
    callbacks: RwLock<Option<Arc<dyn NativeCallbacks>>>,
}

impl MockSdk {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            callbacks: RwLock::new(None),
        }
    }

    fn alloc_raw(state: &mut MockState) -> RawHandle {
        state.next_raw += 1;
        RawHandle::new(state.next_raw)
    }

    // ------------------------------------------------------------------
    // Fixture registration
    // ------------------------------------------------------------------

    /// Register a media object. If `uri` is given, `link_create` on that
    /// string resolves to this object.
    pub fn register_media(&self, kind: HandleKind, name: &str, uri: Option<&str>) -> RawHandle {
        let mut state = self.state.lock();
        let raw = Self::alloc_raw(&mut state);
        state.objects.insert(
            raw,
            MockObject {
                kind,
                name: name.to_string(),
                loaded: true,
                playable: true,
            },
        );
        if let Some(uri) = uri {
            state.uris.insert(uri.to_string(), raw);
        }
        raw
    }

    /// Mark a registered track as unplayable; `player_load` on it fails
    pub fn set_unplayable(&self, raw: RawHandle) {
        if let Some(obj) = self.state.lock().objects.get_mut(&raw) {
            obj.playable = false;
        }
    }

    /// Install the playlist container contents
    pub fn set_playlists(&self, playlists: Vec<RawHandle>) {
        self.state.lock().playlists = playlists;
    }

    pub fn set_starred(&self, raw: RawHandle) {
        self.state.lock().starred = raw;
    }

    // ------------------------------------------------------------------
    // Completion driving
    // ------------------------------------------------------------------

    /// Fire an arbitrary event through the registered callbacks
    pub fn emit(&self, event: NativeEvent) {
        let callbacks = self.callbacks.read().clone();
        if let Some(callbacks) = callbacks {
            callbacks.notify(event);
        }
    }

    /// Finish the pending login and fire `LoggedIn`
    pub fn complete_login(&self, result: Result<()>) {
        let error = match result {
            Ok(()) => {
                let mut state = self.state.lock();
                if let Some((user, remember)) = state.last_login.clone() {
                    if remember {
                        state.remembered_user = Some(user);
                    }
                }
                None
            }
            Err(e) => Some(e),
        };
        self.emit(NativeEvent::LoggedIn { error });
    }

    /// Install results for an issued search, mark it loaded, and fire
    /// `SearchComplete`
    pub fn complete_search(&self, search: RawHandle, results: MockSearchResults) {
        {
            let mut state = self.state.lock();
            if let Some(entry) = state.searches.get_mut(&search) {
                entry.results = results;
                entry.loaded = true;
            }
        }
        self.emit(NativeEvent::SearchComplete { search });
    }

    // ------------------------------------------------------------------
    // Ledger queries
    // ------------------------------------------------------------------

    /// Whether every acquired reference has been released
    pub fn is_balanced(&self) -> bool {
        self.state
            .lock()
            .counts
            .values()
            .all(|c| c.acquired == c.released)
    }

    /// Handles with more acquisitions than releases
    pub fn outstanding(&self) -> Vec<(HandleKind, RawHandle, u64)> {
        self.state
            .lock()
            .counts
            .iter()
            .filter(|(_, c)| c.acquired > c.released)
            .map(|(&(kind, raw), c)| (kind, raw, c.acquired - c.released))
            .collect()
    }

    /// Number of releases that had no matching acquisition
    pub fn double_releases(&self) -> u64 {
        self.state.lock().double_releases
    }

    /// (acquired, released) for one handle
    pub fn ref_counts(&self, kind: HandleKind, raw: RawHandle) -> (u64, u64) {
        let state = self.state.lock();
        let counts = state.counts.get(&(kind, raw)).copied().unwrap_or_default();
        (counts.acquired, counts.released)
    }

    /// Player commands in issue order
    pub fn player_commands(&self) -> Vec<PlayerCommand> {
        self.state.lock().player_commands.clone()
    }

    /// The pagination parameters the last `search_create` carried.
    ///
    /// Raw handles are allocated in increasing order, so the highest search
    /// handle is the most recent request.
    pub fn last_search_request(&self) -> Option<SearchRequestRecord> {
        let state = self.state.lock();
        state
            .searches
            .iter()
            .max_by_key(|(raw, _)| raw.value())
            .map(|(_, s)| s.request.clone())
    }

    pub fn process_events_calls(&self) -> u64 {
        self.state.lock().process_events_calls
    }

    fn record_acquire(state: &mut MockState, kind: HandleKind, raw: RawHandle) {
        state.counts.entry((kind, raw)).or_default().acquired += 1;
    }
}

impl Default for MockSdk {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeSdk for MockSdk {
    fn session_create(
        &self,
        _options: &SessionOptions,
        callbacks: Arc<dyn NativeCallbacks>,
    ) -> Result<()> {
        self.state.lock().session_created = true;
        *self.callbacks.write() = Some(callbacks);
        Ok(())
    }

    fn login(&self, username: &str, _password: &str, remember_me: bool) -> Result<()> {
        let mut state = self.state.lock();
        if !state.session_created {
            return Err(NativeError::NoSession);
        }
        state.last_login = Some((username.to_string(), remember_me));
        Ok(())
    }

    fn relogin(&self) -> Result<()> {
        let mut state = self.state.lock();
        if !state.session_created {
            return Err(NativeError::NoSession);
        }
        match state.remembered_user.clone() {
            Some(user) => {
                state.last_login = Some((user, true));
                Ok(())
            }
            None => Err(NativeError::NoCredentials),
        }
    }

    fn logout(&self) {
        self.emit(NativeEvent::LoggedOut);
    }

    fn forget_me(&self) {
        self.state.lock().remembered_user = None;
    }

    fn remembered_user(&self) -> Option<String> {
        self.state.lock().remembered_user.clone()
    }

    fn process_events(&self) -> Duration {
        self.state.lock().process_events_calls += 1;
        Duration::from_millis(100)
    }

    fn player_load(&self, track: RawHandle) -> Result<()> {
        let mut state = self.state.lock();
        let playable = state
            .objects
            .get(&track)
            .map(|o| o.playable)
            .unwrap_or(false);
        if !playable {
            return Err(NativeError::TrackNotPlayable);
        }
        state.player_commands.push(PlayerCommand::Load(track));
        Ok(())
    }

    fn player_play(&self, play: bool) {
        let command = if play {
            PlayerCommand::Play
        } else {
            PlayerCommand::Stop
        };
        self.state.lock().player_commands.push(command);
    }

    fn player_seek(&self, position_ms: u32) {
        self.state
            .lock()
            .player_commands
            .push(PlayerCommand::Seek(position_ms));
    }

    fn player_unload(&self) {
        self.state.lock().player_commands.push(PlayerCommand::Unload);
    }

    fn search_create(
        &self,
        query: &str,
        tracks: SearchPage,
        albums: SearchPage,
        artists: SearchPage,
        playlists: SearchPage,
        kind: SearchKind,
    ) -> RawHandle {
        let mut state = self.state.lock();
        let raw = Self::alloc_raw(&mut state);
        // The returned handle is an owned reference
        Self::record_acquire(&mut state, HandleKind::Search, raw);
        state.searches.insert(
            raw,
            MockSearch {
                request: SearchRequestRecord {
                    query: query.to_string(),
                    tracks,
                    albums,
                    artists,
                    playlists,
                    kind,
                },
                loaded: false,
                results: MockSearchResults::default(),
            },
        );
        raw
    }

    fn search_is_loaded(&self, search: RawHandle) -> bool {
        self.state
            .lock()
            .searches
            .get(&search)
            .map(|s| s.loaded)
            .unwrap_or(false)
    }

    fn search_num(&self, search: RawHandle, kind: HandleKind) -> u32 {
        let state = self.state.lock();
        let Some(entry) = state.searches.get(&search) else {
            return 0;
        };
        let list = match kind {
            HandleKind::Track => &entry.results.tracks,
            HandleKind::Album => &entry.results.albums,
            HandleKind::Artist => &entry.results.artists,
            HandleKind::Playlist => &entry.results.playlists,
            _ => return 0,
        };
        list.len() as u32
    }

    fn search_item(&self, search: RawHandle, kind: HandleKind, index: u32) -> RawHandle {
        let state = self.state.lock();
        let Some(entry) = state.searches.get(&search) else {
            return RawHandle::NULL;
        };
        let list = match kind {
            HandleKind::Track => &entry.results.tracks,
            HandleKind::Album => &entry.results.albums,
            HandleKind::Artist => &entry.results.artists,
            HandleKind::Playlist => &entry.results.playlists,
            _ => return RawHandle::NULL,
        };
        list.get(index as usize).copied().unwrap_or(RawHandle::NULL)
    }

    fn search_total(&self, search: RawHandle, kind: HandleKind) -> u32 {
        let state = self.state.lock();
        let Some(entry) = state.searches.get(&search) else {
            return 0;
        };
        match kind {
            HandleKind::Track => entry.results.total_tracks,
            HandleKind::Album => entry.results.total_albums,
            HandleKind::Artist => entry.results.total_artists,
            HandleKind::Playlist => entry.results.total_playlists,
            _ => 0,
        }
    }

    fn search_did_you_mean(&self, search: RawHandle) -> String {
        self.state
            .lock()
            .searches
            .get(&search)
            .map(|s| s.results.did_you_mean.clone())
            .unwrap_or_default()
    }

    fn link_create(&self, uri: &str) -> RawHandle {
        let mut state = self.state.lock();

        let (link_type, target) = if let Some(&target) = state.uris.get(uri) {
            let link_type = match state.objects.get(&target).map(|o| o.kind) {
                Some(HandleKind::Track) => LinkType::Track,
                Some(HandleKind::Album) => LinkType::Album,
                Some(HandleKind::Artist) => LinkType::Artist,
                Some(HandleKind::Playlist) => LinkType::Playlist,
                _ => LinkType::Other,
            };
            (link_type, target)
        } else if uri.starts_with("spotify:search:") {
            (LinkType::Search, RawHandle::NULL)
        } else {
            return RawHandle::NULL;
        };

        let raw = Self::alloc_raw(&mut state);
        // Parsed links are owned references
        Self::record_acquire(&mut state, HandleKind::Link, raw);
        state.links.insert(
            raw,
            MockLink {
                link_type,
                target,
                text: uri.to_string(),
            },
        );
        raw
    }

    fn link_type(&self, link: RawHandle) -> LinkType {
        self.state
            .lock()
            .links
            .get(&link)
            .map(|l| l.link_type)
            .unwrap_or(LinkType::Other)
    }

    fn link_as_media(&self, link: RawHandle) -> RawHandle {
        let state = self.state.lock();
        match state.links.get(&link) {
            Some(l) if matches!(l.link_type, LinkType::Track | LinkType::Album | LinkType::Artist) => {
                l.target
            }
            _ => RawHandle::NULL,
        }
    }

    fn link_from_search(&self, search: RawHandle) -> RawHandle {
        let mut state = self.state.lock();
        let Some(query) = state.searches.get(&search).map(|s| s.request.query.clone()) else {
            return RawHandle::NULL;
        };
        let raw = Self::alloc_raw(&mut state);
        Self::record_acquire(&mut state, HandleKind::Link, raw);
        state.links.insert(
            raw,
            MockLink {
                link_type: LinkType::Search,
                target: search,
                text: format!("spotify:search:{query}"),
            },
        );
        raw
    }

    fn link_as_string(&self, link: RawHandle) -> String {
        self.state
            .lock()
            .links
            .get(&link)
            .map(|l| l.text.clone())
            .unwrap_or_default()
    }

    fn media_add_ref(&self, kind: HandleKind, raw: RawHandle) {
        let mut state = self.state.lock();
        Self::record_acquire(&mut state, kind, raw);
    }

    fn media_release(&self, kind: HandleKind, raw: RawHandle) {
        let mut state = self.state.lock();
        let counts = state.counts.entry((kind, raw)).or_default();
        if counts.released >= counts.acquired {
            state.double_releases += 1;
            tracing::warn!(%kind, %raw, "release without matching reference");
            return;
        }
        counts.released += 1;
    }

    fn media_is_loaded(&self, kind: HandleKind, raw: RawHandle) -> bool {
        if kind == HandleKind::Search {
            return self.search_is_loaded(raw);
        }
        self.state
            .lock()
            .objects
            .get(&raw)
            .map(|o| o.loaded)
            .unwrap_or(false)
    }

    fn media_name(&self, _kind: HandleKind, raw: RawHandle) -> String {
        self.state
            .lock()
            .objects
            .get(&raw)
            .map(|o| o.name.clone())
            .unwrap_or_default()
    }

    fn playlist_container(&self) -> Vec<RawHandle> {
        self.state.lock().playlists.clone()
    }

    fn starred_playlist(&self) -> RawHandle {
        self.state.lock().starred
    }
}
