//! One-shot bid timer

use std::time::Duration;
use tokio::task::AbortHandle;

/// A pending re-check of the bid wait.
///
/// `generation` identifies the arming; a firing timer whose generation is no
/// longer the armed one is ignored by the executor.
#[derive(Debug)]
pub(super) struct BidTimer {
    generation: u64,
    task: AbortHandle,
}

impl BidTimer {
    /// Run `on_fire` after `delay` on the current Tokio runtime.
    ///
    /// Returns `None` when called outside a runtime; the wait then only
    /// advances when polled.
    pub(super) fn spawn(
        generation: u64,
        delay: Duration,
        on_fire: impl FnOnce() + Send + 'static,
    ) -> Option<Self> {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(generation, "No Tokio runtime, bid timer not armed");
            return None;
        };

        let task = handle.spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire();
        });

        Some(Self {
            generation,
            task: task.abort_handle(),
        })
    }

    pub(super) fn generation(&self) -> u64 {
        self.generation
    }

    pub(super) fn cancel(self) {
        self.task.abort();
    }
}
