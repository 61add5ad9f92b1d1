//! Owned lifetime of background tasks.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Keeps a set of spawned tasks alive.
///
/// Dropping the handle cancels the tasks without waiting for them;
/// [`TaskHandle::stop`] cancels and waits. Either way no new cycle
/// starts afterwards.
#[derive(Debug)]
pub struct TaskHandle {
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl TaskHandle {
    pub(crate) fn new(cancel: CancellationToken, tasks: Vec<JoinHandle<()>>) -> Self {
        Self { cancel, tasks }
    }

    /// Whether any task is still running.
    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && self.tasks.iter().any(|t| !t.is_finished())
    }

    /// Cancel and wait for every task to finish.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "Background task ended abnormally");
                }
            }
        }
        debug!("Background tasks stopped");
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
