//! harbor server entry point.
//!
//! Loads configuration, opens the store database, runs the install and
//! activate triggers once, then serves MCP on stdio. Logging goes to stderr
//! to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use harbor_client::{FetchConfig, HttpNetwork};
use harbor_core::{AgentConfig, CacheDb, OfflineAgent, Trigger, TriggerOutcome};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

/// Install then activate, as a host does for a newly registered agent.
/// Failures are logged; the server still starts so the triggers can be retried.
async fn bring_up(agent: &OfflineAgent) {
    for trigger in [Trigger::Install, Trigger::Activate] {
        match agent.dispatch(trigger).await {
            Ok(TriggerOutcome::Installed(report)) => {
                tracing::info!(store = %report.store, assets = report.assets.len(), "startup install complete")
            }
            Ok(TriggerOutcome::Activated(report)) => {
                tracing::info!(store = %report.store, deleted = ?report.deleted, "startup activation complete")
            }
            Ok(TriggerOutcome::Fetched(_)) => {}
            Err(err) => {
                tracing::warn!(error = %err, "startup lifecycle stopped");
                return;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AgentConfig::load()?;
    tracing::info!(
        version = %config.version,
        scope = %config.scope,
        db_path = %config.db_path.display(),
        "Starting harbor on stdio transport"
    );

    let db = CacheDb::open(&config.db_path).await?;
    let network = HttpNetwork::new(FetchConfig::from(&config))?;
    let agent = Arc::new(OfflineAgent::new(&config, Arc::new(db), Arc::new(network))?);

    bring_up(&agent).await;

    let handler = handler::HarborServer::new(Arc::clone(&agent));
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    agent.settle().await;

    Ok(())
}
