use thiserror::Error;

/// Failure codes surfaced by the native client library.
///
/// These mirror the library's own error codes. Transient variants describe
/// conditions the library recovers from on its own (the session drops to
/// connection-lost and reconnects); permanent variants end the session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NativeError {
    #[error("invalid username or password")]
    BadCredentials,

    #[error("user account is banned")]
    UserBanned,

    #[error("premium account required")]
    PremiumRequired,

    #[error("client version is too old")]
    ClientTooOld,

    #[error("unable to contact server")]
    UnableToContactServer,

    #[error("network is disabled or unreachable")]
    NetworkDisabled,

    #[error("track is not playable")]
    TrackNotPlayable,

    #[error("no session has been created")]
    NoSession,

    #[error("no stored credentials available")]
    NoCredentials,

    #[error("native library error: {0}")]
    Other(String),
}

impl NativeError {
    /// Whether the condition is transient.
    ///
    /// A transient failure on an established session means connection-lost
    /// followed by automatic recovery, not a terminal logout.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            NativeError::UnableToContactServer | NativeError::NetworkDisabled
        )
    }
}

/// Result type for fallible native-library calls
pub type Result<T> = std::result::Result<T, NativeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(NativeError::UnableToContactServer.is_transient());
        assert!(NativeError::NetworkDisabled.is_transient());
        assert!(!NativeError::BadCredentials.is_transient());
        assert!(!NativeError::UserBanned.is_transient());
    }
}
