//! Paginated multi-category search
//!
//! A [`Search`] is a per-request object: it carries the query and four
//! independent pagination windows, issues one native search on
//! [`execute`](Search::execute), and afterwards serves as the view onto
//! the loaded result. Completion is asynchronous; the registered callback
//! fires exactly once, on the consumer thread, routed through the
//! [`SearchRegistry`] by the raw handle the native layer echoes back.
//!
//! Every result accessor is safe to call at any time: before the native
//! search reports loaded, accessors return neutral values (empty list,
//! zero, empty string) instead of touching unpopulated native state.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use spotify_native::{
    Album, Artist, HandleKind, LinkRef, NativeSdk, Playlist, RawHandle, SearchHandle, SearchKind,
    SearchPage, Track,
};

use crate::error::{Result, SessionError};

/// Completion callbacks for in-flight searches, keyed by the raw native
/// handle.
///
/// There is no cancellation: an abandoned search simply completes with no
/// registration left, and the completion is dropped.
pub struct SearchRegistry {
    pending: Mutex<HashMap<RawHandle, Box<dyn FnOnce() + Send>>>,
}

impl SearchRegistry {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Register the completion callback for an issued search
    pub fn register(&self, search: RawHandle, on_complete: Box<dyn FnOnce() + Send>) {
        self.pending.lock().insert(search, on_complete);
    }

    /// Fire the callback for a completed search.
    ///
    /// Returns whether a callback was registered. The callback runs
    /// outside the registry lock.
    pub fn complete(&self, search: RawHandle) -> bool {
        let callback = self.pending.lock().remove(&search);
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => {
                tracing::trace!(%search, "search completed with no registration");
                false
            }
        }
    }

    /// Number of searches still awaiting completion
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

impl Default for SearchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SearchRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchRegistry")
            .field("pending", &self.pending.lock().len())
            .finish()
    }
}

/// A search request and, once completed, its result
pub struct Search {
    sdk: Arc<dyn NativeSdk>,
    query: String,
    track_page: SearchPage,
    album_page: SearchPage,
    artist_page: SearchPage,
    playlist_page: SearchPage,
    handle: Option<SearchHandle>,
}

impl Search {
    /// Search with default pagination: every category starts at offset 0
    /// with a limit of 10.
    pub fn new(sdk: Arc<dyn NativeSdk>, query: impl Into<String>) -> Self {
        Self {
            sdk,
            query: query.into(),
            track_page: SearchPage::default(),
            album_page: SearchPage::default(),
            artist_page: SearchPage::default(),
            playlist_page: SearchPage::default(),
            handle: None,
        }
    }

    /// Search with a shared offset across all categories, default limits
    pub fn with_offset(sdk: Arc<dyn NativeSdk>, query: impl Into<String>, offset: u32) -> Self {
        let mut search = Self::new(sdk, query);
        search.set_shared_offset(offset);
        search
    }

    /// Search with a shared offset and limit across all categories
    pub fn with_page(
        sdk: Arc<dyn NativeSdk>,
        query: impl Into<String>,
        offset: u32,
        limit: u32,
    ) -> Self {
        let mut search = Self::with_offset(sdk, query, offset);
        search.track_page.limit = limit;
        search.album_page.limit = limit;
        search.artist_page.limit = limit;
        search.playlist_page.limit = limit;
        search
    }

    /// Build a search from positional numeric arguments, as binding layers
    /// receive them: none, a shared offset, or a shared offset and limit.
    ///
    /// More than two numeric arguments is a synchronous error. Negative
    /// values clamp to zero; range handling beyond that is the native
    /// layer's job.
    pub fn from_args(
        sdk: Arc<dyn NativeSdk>,
        query: impl Into<String>,
        args: &[i64],
    ) -> Result<Self> {
        let clamp = |v: i64| v.max(0) as u32;
        match *args {
            [] => Ok(Self::new(sdk, query)),
            [offset] => Ok(Self::with_offset(sdk, query, clamp(offset))),
            [offset, limit] => Ok(Self::with_page(sdk, query, clamp(offset), clamp(limit))),
            _ => Err(SessionError::InvalidSearchArguments { given: args.len() }),
        }
    }

    fn set_shared_offset(&mut self, offset: u32) {
        self.track_page.offset = offset;
        self.album_page.offset = offset;
        self.artist_page.offset = offset;
        self.playlist_page.offset = offset;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    // ------------------------------------------------------------------
    // Pagination accessors. Writable until the search is issued; the
    // native request snapshots them at execute time.
    // ------------------------------------------------------------------

    pub fn track_offset(&self) -> u32 {
        self.track_page.offset
    }

    pub fn set_track_offset(&mut self, offset: u32) {
        self.track_page.offset = offset;
    }

    pub fn track_limit(&self) -> u32 {
        self.track_page.limit
    }

    pub fn set_track_limit(&mut self, limit: u32) {
        self.track_page.limit = limit;
    }

    pub fn album_offset(&self) -> u32 {
        self.album_page.offset
    }

    pub fn set_album_offset(&mut self, offset: u32) {
        self.album_page.offset = offset;
    }

    pub fn album_limit(&self) -> u32 {
        self.album_page.limit
    }

    pub fn set_album_limit(&mut self, limit: u32) {
        self.album_page.limit = limit;
    }

    pub fn artist_offset(&self) -> u32 {
        self.artist_page.offset
    }

    pub fn set_artist_offset(&mut self, offset: u32) {
        self.artist_page.offset = offset;
    }

    pub fn artist_limit(&self) -> u32 {
        self.artist_page.limit
    }

    pub fn set_artist_limit(&mut self, limit: u32) {
        self.artist_page.limit = limit;
    }

    pub fn playlist_offset(&self) -> u32 {
        self.playlist_page.offset
    }

    pub fn set_playlist_offset(&mut self, offset: u32) {
        self.playlist_page.offset = offset;
    }

    pub fn playlist_limit(&self) -> u32 {
        self.playlist_page.limit
    }

    pub fn set_playlist_limit(&mut self, limit: u32) {
        self.playlist_page.limit = limit;
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// Issue the native search.
    ///
    /// Registers `on_complete` and returns immediately; the callback fires
    /// exactly once, on the consumer thread, when the native layer signals
    /// the search loaded. A request object executes once.
    pub fn execute<F>(&mut self, registry: &SearchRegistry, on_complete: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.handle.is_some() {
            return Err(SessionError::SearchAlreadyExecuted);
        }

        let raw = self.sdk.search_create(
            &self.query,
            self.track_page,
            self.album_page,
            self.artist_page,
            self.playlist_page,
            SearchKind::Standard,
        );

        tracing::debug!(query = %self.query, search = %raw, "search issued");
        registry.register(raw, Box::new(on_complete));
        // The creation call handed us an owned reference
        self.handle = Some(SearchHandle::adopt(Arc::clone(&self.sdk), raw));
        Ok(())
    }

    /// The native handle of the issued search, `None` before `execute`
    pub fn raw(&self) -> Option<RawHandle> {
        self.handle.as_ref().map(|handle| handle.raw())
    }

    /// Whether the native search has finished loading
    pub fn loaded(&self) -> bool {
        match &self.handle {
            Some(handle) => handle.is_loaded(),
            None => false,
        }
    }

    /// Raw items of one category, empty until loaded
    fn items(&self, kind: HandleKind) -> Vec<RawHandle> {
        let Some(handle) = &self.handle else {
            return Vec::new();
        };
        if !handle.is_loaded() {
            return Vec::new();
        }
        let raw = handle.raw();
        (0..self.sdk.search_num(raw, kind))
            .map(|i| self.sdk.search_item(raw, kind, i))
            .collect()
    }

    fn total(&self, kind: HandleKind) -> u32 {
        match &self.handle {
            Some(handle) if handle.is_loaded() => self.sdk.search_total(handle.raw(), kind),
            _ => 0,
        }
    }

    // ------------------------------------------------------------------
    // Result accessors. Neutral until loaded; the returned handles hold
    // freshly acquired references, so they outlive this object.
    // ------------------------------------------------------------------

    pub fn tracks(&self) -> Vec<Track> {
        self.items(HandleKind::Track)
            .into_iter()
            .map(|raw| Track::acquire(Arc::clone(&self.sdk), raw))
            .collect()
    }

    pub fn albums(&self) -> Vec<Album> {
        self.items(HandleKind::Album)
            .into_iter()
            .map(|raw| Album::acquire(Arc::clone(&self.sdk), raw))
            .collect()
    }

    pub fn artists(&self) -> Vec<Artist> {
        self.items(HandleKind::Artist)
            .into_iter()
            .map(|raw| Artist::acquire(Arc::clone(&self.sdk), raw))
            .collect()
    }

    pub fn playlists(&self) -> Vec<Playlist> {
        self.items(HandleKind::Playlist)
            .into_iter()
            .map(|raw| Playlist::acquire(Arc::clone(&self.sdk), raw))
            .collect()
    }

    /// Server-side totals; may exceed the returned page
    pub fn total_tracks(&self) -> u32 {
        self.total(HandleKind::Track)
    }

    pub fn total_albums(&self) -> u32 {
        self.total(HandleKind::Album)
    }

    pub fn total_artists(&self) -> u32 {
        self.total(HandleKind::Artist)
    }

    pub fn total_playlists(&self) -> u32 {
        self.total(HandleKind::Playlist)
    }

    /// Suggested spelling correction, empty if none (or not loaded)
    pub fn did_you_mean(&self) -> String {
        match &self.handle {
            Some(handle) if handle.is_loaded() => self.sdk.search_did_you_mean(handle.raw()),
            _ => String::new(),
        }
    }

    /// Canonical shareable link for this search, empty until loaded
    pub fn link(&self) -> String {
        let Some(handle) = &self.handle else {
            return String::new();
        };
        if !handle.is_loaded() {
            return String::new();
        }
        let link = LinkRef::adopt(
            Arc::clone(&self.sdk),
            self.sdk.link_from_search(handle.raw()),
        );
        if link.is_empty() {
            return String::new();
        }
        self.sdk.link_as_string(link.raw())
    }
}

impl std::fmt::Debug for Search {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Search")
            .field("query", &self.query)
            .field("executed", &self.handle.is_some())
            .field("loaded", &self.loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use spotify_native::{MockSdk, MockSearchResults};

    fn sdk() -> (Arc<MockSdk>, Arc<dyn NativeSdk>) {
        let mock = Arc::new(MockSdk::new());
        let sdk: Arc<dyn NativeSdk> = mock.clone();
        (mock, sdk)
    }

    #[test]
    fn test_one_argument_defaults() {
        let (_mock, sdk) = sdk();
        let search = Search::new(sdk, "miles");

        for (offset, limit) in [
            (search.track_offset(), search.track_limit()),
            (search.album_offset(), search.album_limit()),
            (search.artist_offset(), search.artist_limit()),
            (search.playlist_offset(), search.playlist_limit()),
        ] {
            assert_eq!(offset, 0);
            assert_eq!(limit, 10);
        }
    }

    #[test]
    fn test_two_arguments_share_offset() {
        let (_mock, sdk) = sdk();
        let search = Search::with_offset(sdk, "miles", 20);

        assert_eq!(search.track_offset(), 20);
        assert_eq!(search.album_offset(), 20);
        assert_eq!(search.artist_offset(), 20);
        assert_eq!(search.playlist_offset(), 20);
        assert_eq!(search.track_limit(), 10);
        assert_eq!(search.playlist_limit(), 10);
    }

    #[test]
    fn test_three_arguments_share_offset_and_limit() {
        let (_mock, sdk) = sdk();
        let search = Search::with_page(sdk, "miles", 5, 50);

        assert_eq!(search.artist_offset(), 5);
        assert_eq!(search.artist_limit(), 50);
        assert_eq!(search.album_offset(), 5);
        assert_eq!(search.album_limit(), 50);
    }

    #[test]
    fn test_from_args_arity() {
        let (_mock, sdk) = sdk();

        let search = Search::from_args(Arc::clone(&sdk), "q", &[]).unwrap();
        assert_eq!(search.track_offset(), 0);

        let search = Search::from_args(Arc::clone(&sdk), "q", &[7]).unwrap();
        assert_eq!(search.playlist_offset(), 7);

        let search = Search::from_args(Arc::clone(&sdk), "q", &[7, 3]).unwrap();
        assert_eq!(search.playlist_limit(), 3);

        let err = Search::from_args(sdk, "q", &[1, 2, 3]).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidSearchArguments { given: 3 }
        ));
    }

    #[test]
    fn test_from_args_clamps_negative() {
        let (_mock, sdk) = sdk();
        let search = Search::from_args(sdk, "q", &[-4, -1]).unwrap();
        assert_eq!(search.track_offset(), 0);
        assert_eq!(search.track_limit(), 0);
    }

    #[test]
    fn test_accessors_neutral_before_execute() {
        let (_mock, sdk) = sdk();
        let search = Search::new(sdk, "miles");

        assert!(!search.loaded());
        assert!(search.tracks().is_empty());
        assert!(search.albums().is_empty());
        assert!(search.artists().is_empty());
        assert!(search.playlists().is_empty());
        assert_eq!(search.total_tracks(), 0);
        assert_eq!(search.total_playlists(), 0);
        assert_eq!(search.did_you_mean(), "");
        assert_eq!(search.link(), "");
    }

    #[test]
    fn test_accessors_neutral_before_completion() {
        let (_mock, sdk) = sdk();
        let registry = SearchRegistry::new();
        let mut search = Search::new(sdk, "miles");
        search.execute(&registry, || {}).unwrap();

        assert!(!search.loaded());
        assert!(search.tracks().is_empty());
        assert_eq!(search.total_tracks(), 0);
        assert_eq!(search.did_you_mean(), "");
        assert_eq!(search.link(), "");
    }

    #[test]
    fn test_execute_snapshots_pagination() {
        let (mock, sdk) = sdk();
        let registry = SearchRegistry::new();
        let mut search = Search::with_page(sdk, "miles", 2, 25);
        search.set_playlist_limit(5);
        search.execute(&registry, || {}).unwrap();

        let request = mock.last_search_request().unwrap();
        assert_eq!(request.query, "miles");
        assert_eq!(request.tracks, SearchPage::new(2, 25));
        assert_eq!(request.albums, SearchPage::new(2, 25));
        assert_eq!(request.artists, SearchPage::new(2, 25));
        assert_eq!(request.playlists, SearchPage::new(2, 5));
    }

    #[test]
    fn test_execute_twice_is_an_error() {
        let (_mock, sdk) = sdk();
        let registry = SearchRegistry::new();
        let mut search = Search::new(sdk, "miles");
        search.execute(&registry, || {}).unwrap();

        let err = search.execute(&registry, || {}).unwrap_err();
        assert!(matches!(err, SessionError::SearchAlreadyExecuted));
    }

    #[test]
    fn test_completion_fires_exactly_once() {
        let (mock, sdk) = sdk();
        let registry = SearchRegistry::new();
        let mut search = Search::new(sdk, "miles");

        let fired = Arc::new(AtomicUsize::new(0));
        let fired_inner = Arc::clone(&fired);
        search
            .execute(&registry, move || {
                fired_inner.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        assert_eq!(registry.pending_count(), 1);

        let search_raw = search.handle.as_ref().unwrap().raw();
        mock.complete_search(search_raw, MockSearchResults::default());

        // The pump routes the native completion through the registry
        assert!(registry.complete(search_raw));
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // A second completion finds no registration and is dropped
        assert!(!registry.complete(search_raw));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_results_available_after_completion() {
        let (mock, sdk) = sdk();
        let registry = SearchRegistry::new();

        let t = mock.register_media(HandleKind::Track, "So What", None);
        let a = mock.register_media(HandleKind::Album, "Kind of Blue", None);

        let mut search = Search::new(sdk, "miles");
        search.execute(&registry, || {}).unwrap();
        let raw = search.handle.as_ref().unwrap().raw();

        mock.complete_search(
            raw,
            MockSearchResults {
                tracks: vec![t],
                albums: vec![a],
                total_tracks: 1042,
                total_albums: 77,
                did_you_mean: "miles davis".to_string(),
                ..MockSearchResults::default()
            },
        );

        assert!(search.loaded());
        let tracks = search.tracks();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].name(), "So What");
        assert_eq!(search.albums().len(), 1);
        assert_eq!(search.total_tracks(), 1042);
        assert_eq!(search.total_albums(), 77);
        assert_eq!(search.did_you_mean(), "miles davis");
        assert_eq!(search.link(), "spotify:search:miles");
    }

    #[test]
    fn test_result_handles_outlive_search() {
        let (mock, sdk) = sdk();
        let registry = SearchRegistry::new();
        let t = mock.register_media(HandleKind::Track, "Flamenco Sketches", None);

        let tracks = {
            let mut search = Search::new(sdk, "miles");
            search.execute(&registry, || {}).unwrap();
            let raw = search.handle.as_ref().unwrap().raw();
            mock.complete_search(
                raw,
                MockSearchResults {
                    tracks: vec![t],
                    total_tracks: 1,
                    ..MockSearchResults::default()
                },
            );
            search.tracks()
            // search (and its native reference) dropped here
        };

        assert_eq!(tracks[0].name(), "Flamenco Sketches");
        drop(tracks);
        assert!(mock.is_balanced());
        assert_eq!(mock.double_releases(), 0);
    }
}
