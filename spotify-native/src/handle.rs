//! Reference-counted ownership wrappers for native handles
//!
//! The native library reference-counts its objects, but the count lives on
//! the library's side of the boundary: the wrapper's job is to call the
//! acquire/release pair at exactly the right moments. [`MediaRef`] is the
//! scoped owner of one reference; cloning it adds a native reference,
//! dropping it releases exactly one.
//!
//! Two construction modes exist because the library hands out two kinds of
//! reference:
//!
//! - [`MediaRef::adopt`] takes over a reference the caller already owns
//!   (e.g. the handle returned by a search or link creation call).
//! - [`MediaRef::acquire`] adds a new reference for a handle the caller is
//!   only borrowing (e.g. an item inside a loaded search result).
//!
//! A null raw handle produces an empty wrapper whose queries return neutral
//! values. Empty wrappers never call into the library.

use std::fmt;
use std::sync::Arc;

use crate::raw::{HandleKind, RawHandle};
use crate::sdk::NativeSdk;

/// Scoped owner of one native reference.
///
/// Equality is native identity: two wrappers are equal when they refer to
/// the same native object, regardless of how many references either holds.
pub struct MediaRef {
    raw: RawHandle,
    kind: HandleKind,
    /// `None` only in the empty state; an empty wrapper holds no reference
    /// and releases nothing.
    sdk: Option<Arc<dyn NativeSdk>>,
}

impl MediaRef {
    /// Take over an already-owned reference.
    ///
    /// The caller transfers its reference to the wrapper; the wrapper
    /// releases it on drop. A null `raw` yields the empty wrapper.
    pub fn adopt(sdk: Arc<dyn NativeSdk>, kind: HandleKind, raw: RawHandle) -> Self {
        if raw.is_null() {
            return Self::empty(kind);
        }
        Self {
            raw,
            kind,
            sdk: Some(sdk),
        }
    }

    /// Add a new reference to a borrowed handle.
    ///
    /// The caller keeps (or lets go of) its borrow; the wrapper owns the
    /// reference it just added. A null `raw` yields the empty wrapper.
    pub fn acquire(sdk: Arc<dyn NativeSdk>, kind: HandleKind, raw: RawHandle) -> Self {
        if raw.is_null() {
            return Self::empty(kind);
        }
        sdk.media_add_ref(kind, raw);
        Self {
            raw,
            kind,
            sdk: Some(sdk),
        }
    }

    /// The empty wrapper: no reference, all queries neutral
    pub fn empty(kind: HandleKind) -> Self {
        Self {
            raw: RawHandle::NULL,
            kind,
            sdk: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_null()
    }

    pub fn raw(&self) -> RawHandle {
        self.raw
    }

    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    /// Whether the native object has finished loading. `false` when empty.
    pub fn is_loaded(&self) -> bool {
        match &self.sdk {
            Some(sdk) => sdk.media_is_loaded(self.kind, self.raw),
            None => false,
        }
    }

    /// Display name of the native object. Empty string when empty or not
    /// yet loaded.
    pub fn name(&self) -> String {
        match &self.sdk {
            Some(sdk) => sdk.media_name(self.kind, self.raw),
            None => String::new(),
        }
    }
}

impl Clone for MediaRef {
    fn clone(&self) -> Self {
        if let Some(sdk) = &self.sdk {
            sdk.media_add_ref(self.kind, self.raw);
        }
        Self {
            raw: self.raw,
            kind: self.kind,
            sdk: self.sdk.clone(),
        }
    }
}

impl Drop for MediaRef {
    fn drop(&mut self) {
        if let Some(sdk) = &self.sdk {
            sdk.media_release(self.kind, self.raw);
        }
    }
}

impl PartialEq for MediaRef {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.raw == other.raw
    }
}

impl Eq for MediaRef {}

impl fmt::Debug for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaRef")
            .field("kind", &self.kind)
            .field("raw", &self.raw)
            .field("empty", &self.is_empty())
            .finish()
    }
}

/// Generates a typed wrapper over [`MediaRef`] pinned to one handle kind.
macro_rules! media_handle {
    ($(#[$doc:meta])* $name:ident, $kind:expr) => {
        $(#[$doc])*
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name(MediaRef);

        impl $name {
            /// Take over an already-owned reference
            pub fn adopt(sdk: Arc<dyn NativeSdk>, raw: RawHandle) -> Self {
                Self(MediaRef::adopt(sdk, $kind, raw))
            }

            /// Add a new reference to a borrowed handle
            pub fn acquire(sdk: Arc<dyn NativeSdk>, raw: RawHandle) -> Self {
                Self(MediaRef::acquire(sdk, $kind, raw))
            }

            pub fn empty() -> Self {
                Self(MediaRef::empty($kind))
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn raw(&self) -> RawHandle {
                self.0.raw()
            }

            pub fn is_loaded(&self) -> bool {
                self.0.is_loaded()
            }

            pub fn name(&self) -> String {
                self.0.name()
            }
        }

        impl AsRef<MediaRef> for $name {
            fn as_ref(&self) -> &MediaRef {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.0.raw()).finish()
            }
        }
    };
}

media_handle!(
    /// A track the player can load
    Track,
    HandleKind::Track
);

media_handle!(
    /// An album
    Album,
    HandleKind::Album
);

media_handle!(
    /// An artist
    Artist,
    HandleKind::Artist
);

media_handle!(
    /// A playlist
    Playlist,
    HandleKind::Playlist
);

media_handle!(
    /// An in-flight or completed native search object
    SearchHandle,
    HandleKind::Search
);

media_handle!(
    /// A parsed link, held only long enough to resolve it
    LinkRef,
    HandleKind::Link
);
