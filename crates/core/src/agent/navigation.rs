//! Network-first handling for document navigations.

use super::{OfflineAgent, ResponseSource, Served};
use crate::Error;
use crate::http::Request;

impl OfflineAgent {
    /// Go to the network; a completed response refreshes the root entry in the
    /// background and is returned unmodified. On failure, serve the root entry.
    pub(crate) async fn handle_navigation(&self, request: &Request) -> Result<Served, Error> {
        match self.network.fetch(request).await {
            Ok(response) => {
                tracing::debug!(url = %request.url(), status = response.status, "navigation served live");
                self.spawn_store(self.root_request(), response.clone());
                Ok(Served::new(response, ResponseSource::Network))
            }
            Err(err) => self.root_fallback(err).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{FakeNetwork, installed_agent};
    use super::*;
    use crate::cache::CacheStorage;
    use crate::network::NetworkError;
    use url::Url;

    #[tokio::test]
    async fn test_live_navigation_refreshes_root_entry() {
        let network = FakeNetwork::with_app();
        let (agent, db) = installed_agent(network.clone()).await;
        network.serve("https://app.test/", 200, "<html>fresh</html>");

        let served = agent.fetch(&Request::navigate(agent.root_url().clone())).await.unwrap();
        assert_eq!(served.source, ResponseSource::Network);
        assert_eq!(served.response.body.as_ref(), b"<html>fresh</html>");

        agent.settle().await;
        let root = db
            .lookup(agent.registry().current_name(), &Request::get(agent.root_url().clone()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(root.body.as_ref(), b"<html>fresh</html>");
    }

    #[tokio::test]
    async fn test_any_navigation_refreshes_root_entry() {
        let network = FakeNetwork::with_app();
        network.serve("https://app.test/about", 200, "<html>about</html>");
        let (agent, db) = installed_agent(network.clone()).await;

        let about = Request::navigate(Url::parse("https://app.test/about").unwrap());
        agent.fetch(&about).await.unwrap();
        agent.settle().await;

        let root = db
            .lookup(agent.registry().current_name(), &Request::get(agent.root_url().clone()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(root.body.as_ref(), b"<html>about</html>");
        assert!(
            db.lookup(agent.registry().current_name(), &Request::get(about.url().clone()))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_offline_navigation_serves_root_entry() {
        let network = FakeNetwork::with_app();
        let (agent, db) = installed_agent(network.clone()).await;
        let root = agent.root_url().clone();
        db.put(
            agent.registry().current_name(),
            &Request::get(root.clone()),
            &crate::http::CapturedResponse::new(root.as_str(), 200, "R"),
        )
        .await
        .unwrap();
        network.set_offline(true);

        let deep = Request::navigate(Url::parse("https://app.test/reports/2024").unwrap());
        let served = agent.fetch(&deep).await.unwrap();

        assert_eq!(served.source, ResponseSource::Fallback);
        assert_eq!(served.response.body.as_ref(), b"R");
    }

    #[tokio::test]
    async fn test_offline_navigation_without_root_propagates() {
        let network = FakeNetwork::with_app();
        let (agent, db) = installed_agent(network.clone()).await;
        db.delete(agent.registry().current_name()).await.unwrap();
        network.set_offline(true);

        let result = agent.fetch(&Request::navigate(agent.root_url().clone())).await;
        assert!(matches!(result, Err(Error::Network(NetworkError::Connect(_)))));
    }

    #[tokio::test]
    async fn test_error_status_navigation_returned_live() {
        let network = FakeNetwork::with_app();
        let (agent, _db) = installed_agent(network.clone()).await;

        let missing = Request::navigate(Url::parse("https://app.test/missing").unwrap());
        let served = agent.fetch(&missing).await.unwrap();

        assert_eq!(served.source, ResponseSource::Network);
        assert_eq!(served.response.status, 404);
    }
}
