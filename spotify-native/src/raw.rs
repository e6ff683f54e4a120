//! Raw handle and kind types for native-library objects

use std::fmt;

/// Opaque reference to an object owned by the native client library.
///
/// The value is the library's pointer/identifier, carried around without
/// interpretation. Zero is the null handle; every operation on a null
/// handle is a no-op at the wrapper layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawHandle(u64);

impl RawHandle {
    /// The null handle
    pub const NULL: RawHandle = RawHandle(0);

    /// Create a raw handle from the native identifier
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Whether this is the null handle
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Default for RawHandle {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// The kind of native object a handle refers to.
///
/// The native library keeps a separate reference count per object; the kind
/// selects which acquire/release pair applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Track,
    Album,
    Artist,
    Playlist,
    Search,
    Link,
}

impl HandleKind {
    /// Stable lowercase name, used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            HandleKind::Track => "track",
            HandleKind::Album => "album",
            HandleKind::Artist => "artist",
            HandleKind::Playlist => "playlist",
            HandleKind::Search => "search",
            HandleKind::Link => "link",
        }
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
