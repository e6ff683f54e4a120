//! Listener registration and dispatch
//!
//! Callbacks are looked up in two levels: a per-session registration is
//! tried first, falling back to the process-wide registry. If neither has
//! a callback for the event, the event is dropped; that is deliberate,
//! favoring simplicity over guaranteed delivery, and is recorded at trace
//! level so missing registrations can be diagnosed.
//!
//! The process-wide registry is initialized on first use and never torn
//! down.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::events::{SessionEvent, SessionEventKind};

/// A registered session-event callback.
///
/// Runs on the consumer thread, during the pending-event pass.
pub type SessionCallback = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

type CallbackMap = HashMap<SessionEventKind, SessionCallback>;

static GLOBAL_LISTENERS: OnceLock<RwLock<CallbackMap>> = OnceLock::new();

fn global_listeners() -> &'static RwLock<CallbackMap> {
    GLOBAL_LISTENERS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Register a process-wide fallback callback for an event kind.
///
/// Used when an event matters regardless of which session object is in
/// scope. A per-session registration for the same kind takes precedence.
pub fn on_any_session<F>(kind: SessionEventKind, callback: F)
where
    F: Fn(&SessionEvent) + Send + Sync + 'static,
{
    global_listeners().write().insert(kind, Arc::new(callback));
}

/// Remove a process-wide fallback callback
pub fn clear_any_session(kind: SessionEventKind) {
    global_listeners().write().remove(&kind);
}

/// Per-session listener table with process-wide fallback
pub struct ListenerRegistry {
    callbacks: RwLock<CallbackMap>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            callbacks: RwLock::new(HashMap::new()),
        }
    }

    /// Register a callback for an event kind, replacing any previous one
    pub fn on<F>(&self, kind: SessionEventKind, callback: F)
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.callbacks.write().insert(kind, Arc::new(callback));
    }

    /// Remove a registered callback
    pub fn off(&self, kind: SessionEventKind) {
        self.callbacks.write().remove(&kind);
    }

    /// Whether a callback is registered here (fallback not consulted)
    pub fn has(&self, kind: SessionEventKind) -> bool {
        self.callbacks.read().contains_key(&kind)
    }

    /// Dispatch an event: per-session callback first, then the
    /// process-wide fallback, otherwise drop.
    ///
    /// The callback runs outside the registry locks, so it may re-register
    /// listeners.
    pub fn dispatch(&self, event: &SessionEvent) {
        let kind = event.kind();

        let callback = self
            .callbacks
            .read()
            .get(&kind)
            .cloned()
            .or_else(|| global_listeners().read().get(&kind).cloned());

        match callback {
            Some(callback) => callback(event),
            None => {
                tracing::trace!(?kind, "no listener registered, dropping event");
            }
        }
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("registered", &self.callbacks.read().len())
            .finish()
    }
}
