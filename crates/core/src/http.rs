//! Request and response values exchanged between the host, the policies,
//! and the network.

use bytes::Bytes;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

/// How the host classified an intercepted request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestMode {
    /// Top-level document navigation.
    Navigate,
    /// Anything loaded by a document: scripts, styles, images, fetches.
    #[default]
    Subresource,
}

/// An intercepted request.
///
/// The URL never carries a fragment and the method is always uppercase, so
/// two requests for the same resource produce the same cache identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: String,
    url: Url,
    mode: RequestMode,
}

impl Request {
    pub fn new(method: &str, mut url: Url, mode: RequestMode) -> Self {
        url.set_fragment(None);
        Self { method: method.trim().to_ascii_uppercase(), url, mode }
    }

    /// A plain subresource GET.
    pub fn get(url: Url) -> Self {
        Self::new("GET", url, RequestMode::Subresource)
    }

    /// A document navigation GET.
    pub fn navigate(url: Url) -> Self {
        Self::new("GET", url, RequestMode::Navigate)
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn mode(&self) -> RequestMode {
        self.mode
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }
}

/// A response captured off the network or out of a store.
///
/// Cloning is cheap: the body is reference counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedResponse {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl CapturedResponse {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Bytes>) -> Self {
        Self { url: url.into(), status, headers: Vec::new(), body: body.into() }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// True for 2xx statuses.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup, first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
