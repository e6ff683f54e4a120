//! # Session, player and search coordination
//!
//! The middle layer of the SDK: everything that turns native-library
//! mechanics into an API an embedder can hold.
//!
//! - [`Session`]: the connection-state machine, login/logout, link
//!   resolution, and session-event listener dispatch (per-session
//!   registration with a process-wide fallback).
//! - [`Player`]: the idle/playing/paused transport state machine with its
//!   elapsed-seconds and frame counters.
//! - [`Search`]: per-request paginated multi-category search with
//!   neutral-until-loaded result accessors, plus the [`SearchRegistry`]
//!   that routes native completions to their callbacks.
//! - [`SessionConfig`]: where the native library keeps its state, and the
//!   tick cadence.
//!
//! All of these are driven from the consumer thread; the facade crate owns
//! the pump that drains the event bridge and calls into them.

pub mod config;
pub mod error;
pub mod events;
pub mod listener;
pub mod logging;
pub mod player;
pub mod search;
pub mod session;

pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use events::{ConnectionState, SessionEvent, SessionEventKind};
pub use listener::{clear_any_session, on_any_session, ListenerRegistry, SessionCallback};
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use player::{AudioSink, Player, TransportState};
pub use search::{Search, SearchRegistry};
pub use session::{LinkTarget, Session};
