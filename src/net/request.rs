use http::Method;
use std::collections::HashMap;
use url::Url;

/// Snapshot of an outgoing call, built once per `send()` attempt.
///
/// Header names keep the casing they were recorded with. The body is never
/// populated on the hooked path: `send()` does not thread its payload through.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// Request method (e.g., `GET`)
    pub method: Method,
    /// Absolute URL of the request
    pub url: Url,
    /// Headers as recorded by `set_request_header`
    pub headers: HashMap<String, String>,
    /// Request body, if any
    pub body: Option<Vec<u8>>,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Returns a header value using the exact name it was recorded under.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Same request pointed at another URL. Method and headers are kept.
    pub fn with_url(&self, url: Url) -> Self {
        Self {
            url,
            ..self.clone()
        }
    }
}

/// Methods that are uppercased before parsing, the way the legacy client does.
const NORMALIZED_METHODS: [&str; 6] = ["DELETE", "GET", "HEAD", "OPTIONS", "POST", "PUT"];

/// Parses a caller-supplied method. The well-known methods are matched
/// case-insensitively, anything else is kept verbatim as an extension method.
pub fn parse_method(method: &str) -> Result<Method, http::method::InvalidMethod> {
    match NORMALIZED_METHODS.iter().find(|m| m.eq_ignore_ascii_case(method)) {
        Some(known) => Method::from_bytes(known.as_bytes()),
        None => Method::from_bytes(method.as_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_methods_are_uppercased() {
        assert_eq!(parse_method("get").unwrap(), Method::GET);
        assert_eq!(parse_method("Post").unwrap(), Method::POST);
        assert_eq!(parse_method("options").unwrap(), Method::OPTIONS);
        // not in the normalized set, stays an extension method
        assert_eq!(parse_method("patch").unwrap().as_str(), "patch");
        assert!(parse_method("GE T").is_err());
    }

    #[test]
    fn header_lookup_is_case_sensitive() {
        let mut req = RequestDescriptor::new(Method::GET, "https://example.com/".parse().unwrap());
        req.headers.insert("X-Token".into(), "abc".into());

        assert_eq!(req.header("X-Token"), Some("abc"));
        assert_eq!(req.header("x-token"), None);
    }

    #[test]
    fn with_url_keeps_method_and_headers() {
        let mut req = RequestDescriptor::new(Method::POST, "https://example.com/a".parse().unwrap());
        req.headers.insert("Accept".into(), "application/json".into());

        let moved = req.with_url("https://example.com/b?x=1".parse().unwrap());
        assert_eq!(moved.method, Method::POST);
        assert_eq!(moved.url.as_str(), "https://example.com/b?x=1");
        assert_eq!(moved.header("Accept"), Some("application/json"));
    }
}
