//! Native-callback to bridge adapter
//!
//! The one object handed to the native library at session creation. It
//! runs on the library's internal thread and must only enqueue: ordinary
//! events go into the bridge in arrival order, and the main-thread wakeup
//! becomes a coalesced tick.

use spotify_bridge::BridgeHandle;
use spotify_native::{NativeCallbacks, NativeEvent};

pub(crate) struct CallbackRelay {
    handle: BridgeHandle<NativeEvent>,
}

impl CallbackRelay {
    pub(crate) fn new(handle: BridgeHandle<NativeEvent>) -> Self {
        Self { handle }
    }
}

impl NativeCallbacks for CallbackRelay {
    fn notify(&self, event: NativeEvent) {
        let result = match event {
            // "Run the pending-work pass now": same meaning as a periodic
            // tick, so it shares the tick's coalescing
            NativeEvent::NotifyMainThread => self.handle.notify(),
            other => self.handle.send(other),
        };

        if result.is_err() {
            // Consumer gone; the session is shutting down
            tracing::trace!("dropping native event after bridge shutdown");
        }
    }
}
