//! Running flag and cancellation token.
//!
//! [`RunState`] is owned by one engine. Starting a transmission flips the
//! flag on and hands out a [`RunToken`]; the loop polls the token before
//! every pulse and gap and races each wait against it. Anyone holding a
//! [`CancelHandle`] can flip the flag off.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Engine-owned running flag.
#[derive(Debug, Clone)]
pub struct RunState {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

impl RunState {
    /// Flag initially not running.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Current value of the flag.
    pub fn is_running(&self) -> bool {
        *self.tx.borrow()
    }

    /// Set the flag if it was clear. Returns `None` when already running.
    pub fn try_start(&self) -> Option<RunToken> {
        let started = self.tx.send_if_modified(|running| {
            if *running {
                false
            } else {
                *running = true;
                true
            }
        });
        started.then(|| RunToken {
            rx: self.tx.subscribe(),
        })
    }

    /// Clear the flag. No-op when idle.
    pub fn stop(&self) {
        self.tx.send_if_modified(|running| std::mem::replace(running, false));
    }

    /// Handle that can clear the flag from anywhere.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: Arc::clone(&self.tx),
        }
    }
}

/// Cloneable stop button for a [`RunState`].
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Request the running transmission to stop. Safe when idle.
    pub fn cancel(&self) {
        self.tx.send_if_modified(|running| std::mem::replace(running, false));
    }
}

/// Cancellation token for one transmission.
#[derive(Debug, Clone)]
pub struct RunToken {
    rx: watch::Receiver<bool>,
}

impl RunToken {
    /// True until a stop is requested.
    pub fn is_running(&self) -> bool {
        *self.rx.borrow()
    }

    /// Sleep for `duration` unless stopped first.
    ///
    /// Returns `true` if the full duration elapsed while still running.
    pub async fn wait(&mut self, duration: Duration) -> bool {
        if !self.is_running() {
            return false;
        }
        let elapsed = tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.rx.wait_for(|running| !*running) => false,
        };
        elapsed && self.is_running()
    }
}
