//! Agent configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (HARBOR_*)
//! 2. TOML config file (if HARBOR_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cache::VersionId;

mod validation;

pub use validation::ConfigError;

/// Path of the root document relative to the scope.
pub const ROOT_PATH: &str = "./";

/// Agent configuration.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (HARBOR_*)
/// 2. TOML config file (if HARBOR_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Version identifier. Bump it to retire every previously installed store.
    ///
    /// Set via HARBOR_VERSION environment variable.
    #[serde(default = "default_version")]
    pub version: String,

    /// Prefix of every store name this agent owns.
    ///
    /// Set via HARBOR_NAMESPACE environment variable.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Serving origin plus base path. The root entry is this URL.
    ///
    /// Set via HARBOR_SCOPE environment variable.
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Assets captured at install, relative to the scope.
    ///
    /// Set via HARBOR_ASSETS environment variable.
    #[serde(default = "default_assets")]
    pub assets: Vec<String>,

    /// Path to the SQLite store database.
    ///
    /// Set via HARBOR_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for network requests.
    ///
    /// Set via HARBOR_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Network request timeout in milliseconds.
    ///
    /// Set via HARBOR_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum response body size in bytes.
    ///
    /// Set via HARBOR_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Maximum redirects followed per request.
    ///
    /// Set via HARBOR_MAX_REDIRECTS environment variable.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_version() -> String {
    "v1.0.0".into()
}

fn default_namespace() -> String {
    "harbor".into()
}

fn default_scope() -> String {
    "http://localhost:8080/".into()
}

fn default_assets() -> Vec<String> {
    [ROOT_PATH, "./index.html", "./manifest.webmanifest", "./icons/icon-192.png", "./icons/icon-512.png"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./harbor-cache.sqlite")
}

fn default_user_agent() -> String {
    "harbor/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_max_redirects() -> usize {
    5
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            namespace: default_namespace(),
            scope: default_scope(),
            assets: default_assets(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl AgentConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or environment cannot be parsed, or
    /// validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("HARBOR_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("HARBOR_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Parsed scope URL.
    pub fn scope_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.scope).map_err(|e| ConfigError::Invalid { field: "scope".into(), reason: e.to_string() })
    }

    /// The root entry URL (the scope itself, resolved).
    pub fn root_url(&self) -> Result<Url, ConfigError> {
        self.resolve(ROOT_PATH)
    }

    /// Asset list resolved against the scope, in declaration order.
    pub fn asset_urls(&self) -> Result<Vec<Url>, ConfigError> {
        self.assets.iter().map(|path| self.resolve(path)).collect()
    }

    pub fn version_id(&self) -> Result<VersionId, ConfigError> {
        VersionId::new(self.version.clone())
            .map_err(|e| ConfigError::Invalid { field: "version".into(), reason: e.to_string() })
    }

    fn resolve(&self, path: &str) -> Result<Url, ConfigError> {
        let mut url = self
            .scope_url()?
            .join(path)
            .map_err(|e| ConfigError::Invalid { field: "assets".into(), reason: format!("{path}: {e}") })?;
        url.set_fragment(None);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert_eq!(config.version, "v1.0.0");
        assert_eq!(config.namespace, "harbor");
        assert_eq!(config.db_path, PathBuf::from("./harbor-cache.sqlite"));
        assert_eq!(config.user_agent, "harbor/0.1");
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.assets.first().map(String::as_str), Some(ROOT_PATH));
        assert_eq!(config.assets.len(), 5);
    }

    #[test]
    fn test_timeout_duration() {
        let config = AgentConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_asset_urls_resolve_against_scope() {
        let config = AgentConfig {
            scope: "https://app.test/kwh/".into(),
            assets: vec!["./".into(), "./index.html".into(), "./icons/icon-192.png".into()],
            ..Default::default()
        };

        let urls: Vec<String> = config.asset_urls().unwrap().into_iter().map(String::from).collect();
        assert_eq!(
            urls,
            vec!["https://app.test/kwh/", "https://app.test/kwh/index.html", "https://app.test/kwh/icons/icon-192.png"]
        );
        assert_eq!(config.root_url().unwrap().as_str(), "https://app.test/kwh/");
    }
}
