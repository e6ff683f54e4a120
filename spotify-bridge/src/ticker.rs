//! Periodic tick worker
//!
//! The native library requires its pending-work poll to run regularly even
//! when nothing happened, so a dedicated thread posts coalesced ticks into
//! the bridge on a fixed interval. The thread owns a current-thread tokio
//! runtime and shuts down over a command channel.

use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::bridge::BridgeHandle;
use crate::error::{BridgeError, Result};

/// Commands sent to the tick worker thread
#[derive(Debug)]
enum Command {
    /// Change the tick interval
    SetInterval(Duration),
    /// Stop the worker
    Shutdown,
}

/// Handle to the background tick worker.
///
/// Dropping the handle shuts the worker down.
pub struct TickWorker {
    command_tx: mpsc::Sender<Command>,
    _worker: JoinHandle<()>,
}

impl TickWorker {
    /// Spawn the worker, posting a tick into `handle` every `interval`
    pub fn spawn<T: Send + 'static>(
        interval: Duration,
        handle: BridgeHandle<T>,
    ) -> Result<Self> {
        let (command_tx, command_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("spotify-tick".to_string())
            .spawn(move || run_tick_loop(interval, handle, command_rx))
            .map_err(|e| BridgeError::WorkerSpawn(e.to_string()))?;

        Ok(Self {
            command_tx,
            _worker: worker,
        })
    }

    /// Change the tick interval.
    ///
    /// The native pending-work poll reports when it next wants to run; the
    /// session feeds that back through here.
    pub fn set_interval(&self, interval: Duration) -> Result<()> {
        self.command_tx
            .send(Command::SetInterval(interval))
            .map_err(|_| BridgeError::WorkerStopped)
    }

    /// Stop the worker.
    ///
    /// Called automatically on drop; explicit calls are fine too.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(Command::Shutdown);
    }
}

impl Drop for TickWorker {
    fn drop(&mut self) {
        let _ = self.command_tx.send(Command::Shutdown);
    }
}

impl std::fmt::Debug for TickWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickWorker").finish()
    }
}

/// Body of the worker thread
fn run_tick_loop<T: Send + 'static>(
    interval: Duration,
    handle: BridgeHandle<T>,
    command_rx: mpsc::Receiver<Command>,
) {
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to create tokio runtime for tick worker: {}", e);
            return;
        }
    };

    rt.block_on(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        tracing::debug!(?interval, "tick worker started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if handle.notify().is_err() {
                        tracing::debug!("bridge consumer dropped, stopping tick worker");
                        break;
                    }
                }

                // Commands arrive over a sync channel; poll them between ticks
                _ = tokio::time::sleep(Duration::from_millis(10)) => {
                    while let Ok(command) = command_rx.try_recv() {
                        match command {
                            Command::SetInterval(new_interval) => {
                                tracing::debug!(?new_interval, "tick interval changed");
                                ticker = tokio::time::interval(new_interval);
                                ticker.set_missed_tick_behavior(
                                    tokio::time::MissedTickBehavior::Delay,
                                );
                            }
                            Command::Shutdown => {
                                tracing::debug!("tick worker received shutdown");
                                return;
                            }
                        }
                    }
                }
            }
        }
    });

    tracing::debug!("tick worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{BridgeMessage, EventBridge};

    #[test]
    fn test_worker_posts_ticks() {
        let bridge = EventBridge::<u32>::new();
        let worker = TickWorker::spawn(Duration::from_millis(10), bridge.handle()).unwrap();

        let iter = bridge.iter();
        let tick = iter.recv_timeout(Duration::from_secs(2));
        assert_eq!(tick, Some(BridgeMessage::Tick));

        worker.shutdown();
    }

    #[test]
    fn test_ticks_keep_coming_after_consumption() {
        let bridge = EventBridge::<u32>::new();
        let _worker = TickWorker::spawn(Duration::from_millis(10), bridge.handle()).unwrap();

        let iter = bridge.iter();
        for _ in 0..3 {
            let tick = iter.recv_timeout(Duration::from_secs(2));
            assert_eq!(tick, Some(BridgeMessage::Tick));
        }
    }

    #[test]
    fn test_set_interval_accepted_while_running() {
        let bridge = EventBridge::<u32>::new();
        let worker = TickWorker::spawn(Duration::from_millis(50), bridge.handle()).unwrap();

        assert!(worker.set_interval(Duration::from_millis(5)).is_ok());

        let iter = bridge.iter();
        assert_eq!(
            iter.recv_timeout(Duration::from_secs(2)),
            Some(BridgeMessage::Tick)
        );
    }
}
