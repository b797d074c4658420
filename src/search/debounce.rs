//! Cancellable debounce scheduler
//!
//! Each `schedule` supersedes the previously scheduled, not-yet-fired task
//! for the same slot; only the last task scheduled within the window runs.
//! A task that has already fired runs to completion and is never
//! interrupted, so its result can still arrive late. This restart-not-queue
//! behavior is the sole race-prevention mechanism in the search controllers.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default debounce window used by the search controllers.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// One logical debounce slot.
///
/// Superseded tasks notice on waking that a newer ticket was issued and
/// return without running; there is no handle to abort, so in-flight work
/// started by a fired task cannot be cancelled.
pub struct Debouncer {
    delay: Duration,
    ticket: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ticket: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Schedule `task` to run after the debounce delay. Any task previously
    /// scheduled on this slot that has not fired yet is superseded; one that
    /// already fired keeps running.
    pub fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let issued = self.ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let ticket = Arc::clone(&self.ticket);
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Superseded or cancelled while still waiting
            if ticket.load(Ordering::SeqCst) != issued {
                return;
            }
            task.await;
        });
    }

    /// Invalidate the pending task, if any, without scheduling a new one.
    pub fn cancel(&self) {
        self.ticket.fetch_add(1, Ordering::SeqCst);
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
