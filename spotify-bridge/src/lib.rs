//! # Event bridge for spotify-sdk
//!
//! The native streaming library fires callbacks on an internal thread it
//! owns; application logic runs on a single consumer thread. This crate is
//! the one crossing point between the two: a FIFO queue with a cloneable
//! producer handle, a consuming iterator family, and a periodic tick
//! worker.
//!
//! ## Guarantees
//!
//! - Events are delivered in enqueue order; none dropped, none duplicated.
//! - The bridge never interprets payloads; it is generic over the event
//!   type.
//! - Wakeup ticks (periodic, or explicit `notify()`) are collapsed so that
//!   at most one tick is ever queued. Tick handlers are idempotent polls,
//!   so collapsing is lossless. Ordinary events are never collapsed.
//!
//! ## Quick start
//!
//! ```rust
//! use spotify_bridge::{BridgeMessage, EventBridge};
//!
//! let bridge = EventBridge::<String>::new();
//! let handle = bridge.handle();
//!
//! // Producer side (any thread)
//! handle.send("loaded".to_string()).unwrap();
//! handle.notify().unwrap();
//!
//! // Consumer side (one thread)
//! let iter = bridge.iter();
//! assert_eq!(iter.try_recv(), Some(BridgeMessage::Event("loaded".to_string())));
//! assert_eq!(iter.try_recv(), Some(BridgeMessage::Tick));
//! ```

pub mod bridge;
pub mod error;
pub mod iter;
pub mod ticker;

pub use bridge::{BridgeHandle, BridgeMessage, EventBridge};
pub use error::{BridgeError, Result};
pub use iter::{BridgeIterator, TimeoutIter, TryIter};
pub use ticker::TickWorker;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::bridge::{BridgeHandle, BridgeMessage, EventBridge};
    pub use crate::error::BridgeError;
    pub use crate::iter::BridgeIterator;
    pub use crate::ticker::TickWorker;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_concurrent_producers_preserve_per_thread_order() {
        let bridge = EventBridge::<(u8, u32)>::new();

        let mut producers = Vec::new();
        for id in 0u8..4 {
            let handle = bridge.handle();
            producers.push(std::thread::spawn(move || {
                for seq in 0..250 {
                    handle.send((id, seq)).unwrap();
                }
            }));
        }
        for producer in producers {
            producer.join().unwrap();
        }

        let iter = bridge.iter();
        let mut next_seq = [0u32; 4];
        let mut total = 0;
        while let Some(BridgeMessage::Event((id, seq))) =
            iter.recv_timeout(Duration::from_secs(5))
        {
            assert_eq!(seq, next_seq[id as usize], "producer {id} out of order");
            next_seq[id as usize] += 1;
            total += 1;
            if total == 1000 {
                break;
            }
        }
        assert_eq!(next_seq, [250, 250, 250, 250]);
    }
}
