//! Cache-first handling for same-origin subresource GETs.

use url::Url;

use super::{OfflineAgent, ResponseSource, Served};
use crate::Error;
use crate::http::{CapturedResponse, Request};

impl OfflineAgent {
    /// Serve from the current store without revalidation. On a miss go to the
    /// network and store 2xx same-origin responses in the background. On
    /// network failure, serve the root entry.
    pub(crate) async fn handle_resource(&self, request: &Request) -> Result<Served, Error> {
        match self.registry.lookup(request).await {
            Ok(Some(cached)) => {
                tracing::trace!(url = %request.url(), "cache hit");
                return Ok(Served::new(cached, ResponseSource::Cache));
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(url = %request.url(), error = %err, "store lookup failed, treating as miss"),
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if self.is_cacheable(&response) {
                    self.spawn_store(request.clone(), response.clone());
                } else {
                    tracing::debug!(url = %request.url(), status = response.status, "not caching response");
                }
                Ok(Served::new(response, ResponseSource::Network))
            }
            Err(err) => self.root_fallback(err).await,
        }
    }

    /// 2xx and still on the scope origin after redirects.
    fn is_cacheable(&self, response: &CapturedResponse) -> bool {
        response.is_ok()
            && Url::parse(&response.url)
                .map(|url| url.origin() == self.scope.origin())
                .unwrap_or(false)
    }
}
