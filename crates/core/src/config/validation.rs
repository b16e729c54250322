//! Configuration validation rules.
//!
//! This module provides validation logic for `AgentConfig` values
//! after they have been loaded from environment, files, or defaults.

use std::collections::HashSet;

use crate::config::AgentConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AgentConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `version` or `namespace` is blank
    /// - `scope` is not an http(s) URL
    /// - an asset resolves outside the scope origin, appears twice, or the
    ///   root path is missing from the list
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.version_id()?;

        if self.namespace.trim().is_empty() {
            return Err(invalid("namespace", "must not be empty"));
        }

        let scope = self.scope_url()?;
        if !matches!(scope.scheme(), "http" | "https") {
            return Err(invalid("scope", format!("unsupported scheme: {}", scope.scheme())));
        }

        if self.assets.is_empty() {
            return Err(ConfigError::Missing {
                field: "assets".into(),
                hint: "list at least the root path \"./\"".into(),
            });
        }

        let root = self.root_url()?;
        let assets = self.asset_urls()?;
        let mut seen = HashSet::new();
        for (path, url) in self.assets.iter().zip(&assets) {
            if url.origin() != scope.origin() {
                return Err(invalid("assets", format!("{path} is not same-origin with the scope")));
            }
            if !seen.insert(url.as_str()) {
                return Err(invalid("assets", format!("{path} is listed more than once")));
            }
        }
        if !seen.contains(root.as_str()) {
            return Err(invalid("assets", "must include the root path"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.max_redirects == 0 {
            tracing::warn!("max_redirects is 0; redirected assets will fail to install");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: Result<(), ConfigError>) -> Option<String> {
        match result {
            Err(ConfigError::Invalid { field, .. }) | Err(ConfigError::Missing { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn test_validate_default_config() {
        let config = AgentConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_version() {
        let config = AgentConfig { version: " ".into(), ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("version"));
    }

    #[test]
    fn test_validate_empty_namespace() {
        let config = AgentConfig { namespace: String::new(), ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("namespace"));
    }

    #[test]
    fn test_validate_bad_scope() {
        let config = AgentConfig { scope: "not a url".into(), ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("scope"));

        let config = AgentConfig { scope: "ftp://app.test/".into(), ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("scope"));
    }

    #[test]
    fn test_validate_missing_root() {
        let config = AgentConfig { assets: vec!["./index.html".into()], ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("assets"));
    }

    #[test]
    fn test_validate_empty_assets() {
        let config = AgentConfig { assets: Vec::new(), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_validate_cross_origin_asset() {
        let config =
            AgentConfig { assets: vec!["./".into(), "https://cdn.test/lib.js".into()], ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("assets"));
    }

    #[test]
    fn test_validate_duplicate_asset() {
        let config = AgentConfig {
            assets: vec!["./".into(), "./index.html".into(), "index.html#top".into()],
            ..Default::default()
        };
        assert_eq!(field_of(config.validate()).as_deref(), Some("assets"));
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let config = AgentConfig { timeout_ms: 50, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("timeout_ms"));

        let config = AgentConfig { timeout_ms: 301_000, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("timeout_ms"));
    }

    #[test]
    fn test_validate_max_bytes_bounds() {
        let config = AgentConfig { max_bytes: 0, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("max_bytes"));

        let config = AgentConfig { max_bytes: 51 * 1024 * 1024, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("max_bytes"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AgentConfig { user_agent: String::new(), ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("user_agent"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AgentConfig { max_bytes: 1, timeout_ms: 100, ..Default::default() };
        assert!(config.validate().is_ok());

        let config = AgentConfig { max_bytes: 50 * 1024 * 1024, timeout_ms: 300_000, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
