use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("session error: {0}")]
    Session(#[from] spotify_session::SessionError),

    #[error("native library error: {0}")]
    Native(#[from] spotify_native::NativeError),

    #[error("event bridge error: {0}")]
    Bridge(#[from] spotify_bridge::BridgeError),

    #[error("could not read configuration from {path}: {reason}")]
    ConfigRead { path: String, reason: String },
}
