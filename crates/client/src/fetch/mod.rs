//! HTTP implementation of the agent's network seam.
//!
//! ### Behavior
//! - Any completed exchange is returned as a response, whatever its status;
//!   the policies decide what a 404 means
//! - Timeouts, connection failures, and oversized bodies are errors
//! - Max redirects: 5 (configurable); the final URL is reported so the
//!   resource policy can refuse to cache cross-origin redirects
//! - Max body bytes: 5MB (configurable)
//! - No retries

pub mod url;

use async_trait::async_trait;
use reqwest::{Client, Method, header};
use std::time::{Duration, Instant};

pub use self::url::{UrlError, canonicalize};

use harbor_core::{AgentConfig, CapturedResponse, Error, Network, NetworkError, Request};

/// Configuration for the HTTP network.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "harbor/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "harbor/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

impl From<&AgentConfig> for FetchConfig {
    fn from(config: &AgentConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            max_redirects: config.max_redirects,
        }
    }
}

fn classify(err: &reqwest::Error) -> NetworkError {
    if err.is_timeout() {
        NetworkError::Timeout(err.to_string())
    } else if err.is_connect() {
        NetworkError::Connect(err.to_string())
    } else {
        NetworkError::Other(err.to_string())
    }
}

/// reqwest-backed [`Network`].
pub struct HttpNetwork {
    http: Client,
    config: FetchConfig,
}

impl HttpNetwork {
    /// Create a new HTTP network with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::InvalidInput(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn too_large(&self, len: usize) -> NetworkError {
        NetworkError::TooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes))
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> Result<CapturedResponse, NetworkError> {
        let start = Instant::now();
        let method = Method::from_bytes(request.method().as_bytes())
            .map_err(|e| NetworkError::Other(format!("invalid method {}: {}", request.method(), e)))?;

        let response = self
            .http
            .request(method, request.url().as_str())
            .send()
            .await
            .map_err(|e| classify(&e))?;

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(self.too_large(len as usize));
        }

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();

        let body = response.bytes().await.map_err(|e| classify(&e))?;

        if body.len() > self.config.max_bytes {
            return Err(self.too_large(body.len()));
        }

        let captured = CapturedResponse { url: final_url, status, headers, body };

        tracing::debug!(
            method = request.method(),
            url = %request.url(),
            final_url = %captured.url,
            status = captured.status,
            bytes = captured.body.len(),
            fetch_ms = start.elapsed().as_millis() as u64,
            content_type = captured.header(header::CONTENT_TYPE.as_str()).unwrap_or(""),
            "fetched"
        );

        Ok(captured)
    }
}
