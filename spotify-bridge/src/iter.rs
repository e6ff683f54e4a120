//! Consuming iterators for the bridge
//!
//! Blocking, non-blocking, and timeout-bounded consumption of
//! [`BridgeMessage`]s, mirroring the channel-receiver method family.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use crate::bridge::BridgeMessage;

/// Blocking iterator over bridge messages
///
/// This iterator blocks on `next()` until a message is available. Use
/// `try_recv()` for non-blocking access or `recv_timeout()` to bound the
/// wait.
pub struct BridgeIterator<T> {
    rx: Arc<Mutex<mpsc::Receiver<BridgeMessage<T>>>>,
    tick_queued: Arc<AtomicBool>,
}

impl<T> BridgeIterator<T> {
    pub(crate) fn new(
        rx: Arc<Mutex<mpsc::Receiver<BridgeMessage<T>>>>,
        tick_queued: Arc<AtomicBool>,
    ) -> Self {
        Self { rx, tick_queued }
    }

    /// Consuming a tick re-arms coalescing: the next `notify()` queues a
    /// fresh one.
    fn observe(&self, message: BridgeMessage<T>) -> BridgeMessage<T> {
        if matches!(message, BridgeMessage::Tick) {
            self.tick_queued.store(false, Ordering::Release);
        }
        message
    }

    /// Block until a message is available.
    ///
    /// Returns `None` if every producer handle has been dropped.
    pub fn recv(&self) -> Option<BridgeMessage<T>> {
        let message = self.rx.lock().ok()?.recv().ok()?;
        Some(self.observe(message))
    }

    /// Receive without blocking.
    ///
    /// Returns `None` if no message is currently queued.
    pub fn try_recv(&self) -> Option<BridgeMessage<T>> {
        let message = self.rx.lock().ok()?.try_recv().ok()?;
        Some(self.observe(message))
    }

    /// Block until a message is available or the timeout expires
    pub fn recv_timeout(&self, timeout: Duration) -> Option<BridgeMessage<T>> {
        let message = self.rx.lock().ok()?.recv_timeout(timeout).ok()?;
        Some(self.observe(message))
    }

    /// Non-blocking iterator over currently queued messages
    pub fn try_iter(&self) -> TryIter<'_, T> {
        TryIter { inner: self }
    }

    /// Blocking iterator waiting up to `timeout` per message
    pub fn timeout_iter(&self, timeout: Duration) -> TimeoutIter<'_, T> {
        TimeoutIter {
            inner: self,
            timeout,
        }
    }
}

impl<T> Iterator for BridgeIterator<T> {
    type Item = BridgeMessage<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

impl<T> Clone for BridgeIterator<T> {
    fn clone(&self) -> Self {
        Self {
            rx: Arc::clone(&self.rx),
            tick_queued: Arc::clone(&self.tick_queued),
        }
    }
}

/// Non-blocking iterator over currently queued messages
pub struct TryIter<'a, T> {
    inner: &'a BridgeIterator<T>,
}

impl<'a, T> Iterator for TryIter<'a, T> {
    type Item = BridgeMessage<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.try_recv()
    }
}

/// Blocking iterator with a per-message timeout
pub struct TimeoutIter<'a, T> {
    inner: &'a BridgeIterator<T>,
    timeout: Duration,
}

impl<'a, T> Iterator for TimeoutIter<'a, T> {
    type Item = BridgeMessage<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.recv_timeout(self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::EventBridge;

    #[test]
    fn test_try_recv_empty() {
        let bridge = EventBridge::<u32>::new();
        let iter = bridge.iter();
        assert!(iter.try_recv().is_none());
    }

    #[test]
    fn test_recv_timeout_expires() {
        let bridge = EventBridge::<u32>::new();
        let iter = bridge.iter();

        let start = std::time::Instant::now();
        assert!(iter.recv_timeout(Duration::from_millis(50)).is_none());
        assert!(start.elapsed() >= Duration::from_millis(45));
    }

    #[test]
    fn test_try_iter_drains_queue() {
        let bridge = EventBridge::<u32>::new();
        let handle = bridge.handle();
        for i in 0..3 {
            handle.send(i).unwrap();
        }

        let iter = bridge.iter();
        let drained: Vec<_> = iter.try_iter().collect();
        assert_eq!(
            drained,
            vec![
                BridgeMessage::Event(0),
                BridgeMessage::Event(1),
                BridgeMessage::Event(2)
            ]
        );
    }

    #[test]
    fn test_recv_none_when_producers_gone() {
        let bridge = EventBridge::<u32>::new();
        let iter = bridge.iter();
        let handle = bridge.handle();
        handle.send(7).unwrap();
        drop(handle);
        drop(bridge); // drops the internal handle too

        assert_eq!(iter.recv(), Some(BridgeMessage::Event(7)));
        assert!(iter.recv().is_none());
    }
}
