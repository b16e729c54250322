//! Boundary filter deciding which intercepted requests the policies see.

use url::Url;

use crate::http::{Request, RequestMode};

/// Why a request was left to default network behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassReason {
    NotGet,
    CrossOrigin,
    NotControlling,
}

/// Routing decision for one intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    PassThrough(PassReason),
    Navigation,
    Resource,
}

/// Only same-origin GETs are handled; the mode picks the policy.
pub fn classify(request: &Request, scope: &Url) -> Route {
    if !request.is_get() {
        return Route::PassThrough(PassReason::NotGet);
    }
    if request.url().origin() != scope.origin() {
        return Route::PassThrough(PassReason::CrossOrigin);
    }
    match request.mode() {
        RequestMode::Navigate => Route::Navigation,
        RequestMode::Subresource => Route::Resource,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> Url {
        Url::parse("https://app.test/kwh/").unwrap()
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_navigation_routed() {
        let req = Request::navigate(url("https://app.test/kwh/"));
        assert_eq!(classify(&req, &scope()), Route::Navigation);
    }

    #[test]
    fn test_subresource_routed() {
        let req = Request::get(url("https://app.test/kwh/app.js"));
        assert_eq!(classify(&req, &scope()), Route::Resource);
    }

    #[test]
    fn test_origin_not_path_decides() {
        let req = Request::get(url("https://app.test/other/app.js"));
        assert_eq!(classify(&req, &scope()), Route::Resource);
    }

    #[test]
    fn test_non_get_passes_through() {
        let req = Request::new("POST", url("https://app.test/kwh/api"), RequestMode::Subresource);
        assert_eq!(classify(&req, &scope()), Route::PassThrough(PassReason::NotGet));
    }

    #[test]
    fn test_cross_origin_passes_through() {
        for other in ["https://cdn.test/kwh/app.js", "http://app.test/kwh/app.js", "https://app.test:8443/kwh/"] {
            let req = Request::navigate(url(other));
            assert_eq!(classify(&req, &scope()), Route::PassThrough(PassReason::CrossOrigin), "{other}");
        }
    }
}
