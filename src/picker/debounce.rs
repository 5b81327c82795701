//! Single rescheduling timer.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// Runs at most one pending task, `delay` after the last `schedule` call.
///
/// Only the wait is cancellable. Once the delay elapses the task is spawned
/// on its own, so a later `schedule` or `cancel` never aborts work that has
/// already started.
#[derive(Debug)]
pub(crate) struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Cancels the pending timer, if any, and arms a new one for `task`.
    pub(crate) fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(task);
        });
        if let Some(previous) = self.pending.lock().replace(timer) {
            previous.abort();
            tracing::debug!("debounce timer rescheduled");
        }
    }

    /// Cancels the pending timer. Returns `true` if one was still waiting.
    pub(crate) fn cancel(&self) -> bool {
        match self.pending.lock().take() {
            Some(timer) => {
                let waiting = !timer.is_finished();
                timer.abort();
                waiting
            }
            None => false,
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(timer) = self.pending.get_mut().take() {
            timer.abort();
        }
    }
}
