//! Request identity keys.

use sha2::{Digest, Sha256};

use crate::http::Request;

/// Compute the storage key for a request identity (method + URL).
pub fn compute_request_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Storage key for an already normalized request.
pub fn request_key(request: &Request) -> String {
    compute_request_key(request.method(), request.url().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_hash_stability() {
        let hash1 = compute_request_key("GET", "https://app.test/");
        let hash2 = compute_request_key("GET", "https://app.test/");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_different_method() {
        let get = compute_request_key("GET", "https://app.test/");
        let head = compute_request_key("HEAD", "https://app.test/");
        assert_ne!(get, head);
    }

    #[test]
    fn test_fragment_does_not_change_identity() {
        let plain = Request::get(Url::parse("https://app.test/index.html").unwrap());
        let anchored = Request::get(Url::parse("https://app.test/index.html#main").unwrap());
        assert_eq!(request_key(&plain), request_key(&anchored));
    }

    #[test]
    fn test_hash_format() {
        let hash = compute_request_key("GET", "https://app.test/");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
