//! Fire-and-forget store writes issued after a live response is returned.

use tokio_util::task::TaskTracker;

use crate::cache::StoreRegistry;
use crate::http::{CapturedResponse, Request};

/// Tracks spawned writes so hosts can flush them; the request path never
/// waits on them.
#[derive(Default)]
pub(crate) struct BackgroundWrites {
    tracker: TaskTracker,
}

impl BackgroundWrites {
    /// Spawn a write of `response` under `request` in the current store.
    /// Failure is logged and dropped.
    pub(crate) fn spawn(&self, registry: StoreRegistry, request: Request, response: CapturedResponse) {
        self.tracker.spawn(async move {
            match registry.store(&request, &response).await {
                Ok(()) => tracing::debug!(
                    store = registry.current_name(),
                    url = %request.url(),
                    bytes = response.body.len(),
                    "stored response"
                ),
                Err(err) => tracing::warn!(
                    store = registry.current_name(),
                    url = %request.url(),
                    error = %err,
                    "background store write failed"
                ),
            }
        });
    }

    pub(crate) fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until every write spawned so far has finished.
    pub(crate) async fn settle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}
