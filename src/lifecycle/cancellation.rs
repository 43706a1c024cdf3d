//! Cooperative cancellation for suspended calls.

use tokio::sync::watch;

/// Cancellation handle shared between a caller and the calls it started.
///
/// Clones observe the same signal. Unlike a broadcast channel, a handle that
/// was cancelled before a call subscribed still reports as cancelled.
#[derive(Debug, Clone)]
pub struct Cancellation {
    tx: watch::Sender<bool>,
}

impl Cancellation {
    /// Create a new, not yet cancelled handle.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Signal every waiter.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once the handle is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Number of calls currently waiting on this handle.
    pub fn waiter_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}
