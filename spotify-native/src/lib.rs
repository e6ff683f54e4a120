//! # Native library surface for spotify-sdk
//!
//! The streaming client library is a linked black box: it owns the
//! connection, an object graph addressed through opaque reference-counted
//! handles, and an internal thread that fires callbacks. This crate
//! defines that boundary for the rest of the workspace:
//!
//! - [`NativeSdk`] / [`NativeCallbacks`]: the calls made into the library
//!   and the event sink it pushes out through.
//! - [`MediaRef`] and the typed handles ([`Track`], [`Album`], [`Artist`],
//!   [`Playlist`], [`SearchHandle`], [`LinkRef`]): RAII owners of exactly
//!   one native reference each. Clone acquires, drop releases.
//! - [`MockSdk`] (behind the `test-support` feature): a counting fake that
//!   lets the whole coordination layer be exercised without the
//!   proprietary library present.
//!
//! ## Ownership rules at the boundary
//!
//! The native reference count lives inside the library, not in the
//! wrapper. Handles returned by creation calls (`search_create`,
//! `link_create`, `link_from_search`) are **owned** and are wrapped with
//! `adopt`; handles read out of another object (`search_item`,
//! `link_as_media`, `playlist_container`) are **borrowed** and are wrapped
//! with `acquire`. Each trait method documents which case applies.

pub mod error;
pub mod handle;
pub mod raw;
pub mod sdk;

#[cfg(any(test, feature = "test-support"))]
pub mod mock;

pub use error::{NativeError, Result};
pub use handle::{Album, Artist, LinkRef, MediaRef, Playlist, SearchHandle, Track};
pub use raw::{HandleKind, RawHandle};
pub use sdk::{
    LinkType, NativeCallbacks, NativeEvent, NativeSdk, SearchKind, SearchPage, SessionOptions,
};

#[cfg(any(test, feature = "test-support"))]
pub use mock::{MockSdk, MockSearchResults, PlayerCommand};
