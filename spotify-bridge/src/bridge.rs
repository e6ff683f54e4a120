//! The cross-thread hand-off itself
//!
//! One or more producer threads (in practice, the native library's internal
//! callback thread) push messages through a [`BridgeHandle`]; exactly one
//! consumer drains them through a [`BridgeIterator`](crate::BridgeIterator).
//! Messages are delivered in enqueue order, none dropped, none duplicated.
//!
//! Two message kinds cross the bridge:
//!
//! - `Event(T)`: an ordinary payload, never coalesced.
//! - `Tick`: a wakeup meaning "run the pending-work poll now". Ticks come
//!   from both the periodic tick worker and explicit `notify()` calls, and
//!   rapid repeats are collapsed: at most one tick sits in the queue at any
//!   moment. Tick handlers are idempotent polls, so collapsing loses
//!   nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};

use crate::error::{BridgeError, Result};
use crate::iter::BridgeIterator;

/// A message delivered to the bridge consumer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeMessage<T> {
    /// An ordinary event, in enqueue order
    Event(T),
    /// A coalesced wakeup: run the pending-work poll
    Tick,
}

/// The consumer end of the bridge.
///
/// Created once per session; hand out producer [`BridgeHandle`]s with
/// [`handle()`](EventBridge::handle) and drain with
/// [`iter()`](EventBridge::iter).
pub struct EventBridge<T> {
    rx: Arc<Mutex<mpsc::Receiver<BridgeMessage<T>>>>,
    handle: BridgeHandle<T>,
}

impl<T: Send + 'static> EventBridge<T> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let tick_queued = Arc::new(AtomicBool::new(false));
        Self {
            rx: Arc::new(Mutex::new(rx)),
            handle: BridgeHandle { tx, tick_queued },
        }
    }

    /// A producer handle. Cheap to clone, safe to hand to other threads.
    pub fn handle(&self) -> BridgeHandle<T> {
        self.handle.clone()
    }

    /// The consuming iterator.
    ///
    /// The bridge has a single logical consumer; iterators share one
    /// receiver, so messages go to whichever call drains first.
    pub fn iter(&self) -> BridgeIterator<T> {
        BridgeIterator::new(Arc::clone(&self.rx), Arc::clone(&self.handle.tick_queued))
    }
}

impl<T: Send + 'static> Default for EventBridge<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for EventBridge<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBridge").finish()
    }
}

/// Producer end of the bridge.
///
/// `send` enqueues an event; `notify` requests a coalesced wakeup. Both are
/// non-blocking and safe from any thread, which is exactly what the native
/// library's callback thread requires.
pub struct BridgeHandle<T> {
    tx: mpsc::Sender<BridgeMessage<T>>,
    tick_queued: Arc<AtomicBool>,
}

impl<T> BridgeHandle<T> {
    /// Enqueue an event in arrival order
    pub fn send(&self, event: T) -> Result<()> {
        self.tx
            .send(BridgeMessage::Event(event))
            .map_err(|_| BridgeError::ConsumerDisconnected)
    }

    /// Request a wakeup.
    ///
    /// If a tick is already queued and not yet consumed, this is a no-op;
    /// the pending tick covers this request.
    pub fn notify(&self) -> Result<()> {
        if self.tick_queued.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        if self.tx.send(BridgeMessage::Tick).is_err() {
            self.tick_queued.store(false, Ordering::Release);
            return Err(BridgeError::ConsumerDisconnected);
        }
        Ok(())
    }
}

impl<T> Clone for BridgeHandle<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            tick_queued: Arc::clone(&self.tick_queued),
        }
    }
}

impl<T> std::fmt::Debug for BridgeHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeHandle")
            .field("tick_queued", &self.tick_queued.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_events_arrive_in_order() {
        let bridge = EventBridge::<u32>::new();
        let handle = bridge.handle();

        for i in 0..100 {
            handle.send(i).unwrap();
        }

        let iter = bridge.iter();
        for expected in 0..100 {
            match iter.try_recv() {
                Some(BridgeMessage::Event(i)) => assert_eq!(i, expected),
                other => panic!("expected event {expected}, got {other:?}"),
            }
        }
        assert!(iter.try_recv().is_none());
    }

    #[test]
    fn test_ordering_across_thread() {
        let bridge = EventBridge::<u32>::new();
        let handle = bridge.handle();

        let producer = std::thread::spawn(move || {
            for i in 0..1000 {
                handle.send(i).unwrap();
            }
        });

        let iter = bridge.iter();
        let mut expected = 0;
        while expected < 1000 {
            if let Some(BridgeMessage::Event(i)) =
                iter.recv_timeout(Duration::from_secs(5))
            {
                assert_eq!(i, expected);
                expected += 1;
            }
        }
        producer.join().unwrap();
    }

    #[test]
    fn test_ticks_are_coalesced() {
        let bridge = EventBridge::<u32>::new();
        let handle = bridge.handle();

        for _ in 0..5 {
            handle.notify().unwrap();
        }

        let iter = bridge.iter();
        assert_eq!(iter.try_recv(), Some(BridgeMessage::Tick));
        assert!(iter.try_recv().is_none());

        // Once consumed, the next notify queues a fresh tick
        handle.notify().unwrap();
        assert_eq!(iter.try_recv(), Some(BridgeMessage::Tick));
    }

    #[test]
    fn test_events_are_never_coalesced() {
        let bridge = EventBridge::<&'static str>::new();
        let handle = bridge.handle();

        handle.send("a").unwrap();
        handle.notify().unwrap();
        handle.send("b").unwrap();
        handle.notify().unwrap();

        let iter = bridge.iter();
        assert_eq!(iter.try_recv(), Some(BridgeMessage::Event("a")));
        assert_eq!(iter.try_recv(), Some(BridgeMessage::Tick));
        assert_eq!(iter.try_recv(), Some(BridgeMessage::Event("b")));
        assert!(iter.try_recv().is_none());
    }

    #[test]
    fn test_send_after_consumer_dropped() {
        let bridge = EventBridge::<u32>::new();
        let handle = bridge.handle();
        drop(bridge);

        assert_eq!(handle.send(1), Err(BridgeError::ConsumerDisconnected));
        assert_eq!(handle.notify(), Err(BridgeError::ConsumerDisconnected));
    }
}
