use thiserror::Error;

/// Errors that can occur in the event bridge
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The consuming side of the bridge has been dropped
    #[error("event consumer has disconnected")]
    ConsumerDisconnected,

    /// The tick worker thread could not be started
    #[error("failed to spawn tick worker: {0}")]
    WorkerSpawn(String),

    /// The tick worker is no longer running
    #[error("tick worker has shut down")]
    WorkerStopped,
}

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;
