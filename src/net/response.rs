//! Response model shared by transports and interceptors.
//!
//! A [`ResponseDescriptor`] contains the final URL (after redirects, if the
//! transport follows them), status code + reason, response headers and the
//! body. The body is either already buffered or a stream of chunks that still
//! has to be drained; consumers call [`ResponseBody::into_bytes`] to get the
//! full byte sequence.
//!
//! ## Notes
//! - `headers` is an `http::HeaderMap`, which is **case-insensitive** for
//!   header names. The request object does not expose response headers, they
//!   are carried for interceptors that inspect them.
//! - `status_text` is typically derived from the status code's canonical
//!   reason phrase and may be `"Unknown"` for non-standard codes.
//!
use futures::stream::BoxStream;
use futures::TryStreamExt;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use serde::Serialize;
use std::fmt;

/// Body of a response.
pub enum ResponseBody {
    /// Fully buffered body bytes
    Buffered(Vec<u8>),
    /// Body chunks that still have to be read
    Stream(BoxStream<'static, anyhow::Result<Vec<u8>>>),
}

impl ResponseBody {
    /// Reads the whole body into a single byte sequence.
    pub async fn into_bytes(self) -> anyhow::Result<Vec<u8>> {
        match self {
            ResponseBody::Buffered(bytes) => Ok(bytes),
            ResponseBody::Stream(stream) => {
                stream
                    .try_fold(Vec::new(), |mut acc, chunk| async move {
                        acc.extend_from_slice(&chunk);
                        Ok::<_, anyhow::Error>(acc)
                    })
                    .await
            }
        }
    }
}

impl Default for ResponseBody {
    fn default() -> Self {
        ResponseBody::Buffered(Vec::new())
    }
}

impl From<Vec<u8>> for ResponseBody {
    fn from(bytes: Vec<u8>) -> Self {
        ResponseBody::Buffered(bytes)
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseBody::Buffered(bytes) => write!(f, "Buffered({} bytes)", bytes.len()),
            ResponseBody::Stream(_) => write!(f, "Stream(..)"),
        }
    }
}

/// Response as yielded by a producer or a transport.
#[derive(Debug)]
pub struct ResponseDescriptor {
    /// Final URL of the response (after redirects, if any).
    pub url: url::Url,

    /// Numeric HTTP status code (e.g., `200`, `404`).
    pub status: u16,

    /// Human-readable reason phrase (e.g., `"OK"`, `"Not Found"`).
    pub status_text: String,

    /// Response headers as a case-insensitive map.
    pub headers: HeaderMap,

    /// Response body.
    pub body: ResponseBody,
}

impl ResponseDescriptor {
    /// Creates a response with the canonical reason phrase for `status` and no headers.
    pub fn new(url: url::Url, status: u16, body: impl Into<ResponseBody>) -> Self {
        Self {
            url,
            status,
            status_text: reason_phrase(status),
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Creates a `200 OK` JSON response from any serializable value.
    pub fn json<T: Serialize>(url: url::Url, value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        let mut resp = Self::new(url, 200, body);
        resp.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        Ok(resp)
    }

    /// Replaces the reason phrase.
    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = text.into();
        self
    }

    /// True for 2xx statuses
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Canonical reason phrase for a status code, `"Unknown"` when there is none.
pub(crate) fn reason_phrase(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn url() -> url::Url {
        "https://example.com/data".parse().unwrap()
    }

    #[tokio::test]
    async fn stream_body_is_drained_in_order() {
        let chunks: Vec<anyhow::Result<Vec<u8>>> = vec![Ok(b"hel".to_vec()), Ok(b"lo".to_vec())];
        let body = ResponseBody::Stream(Box::pin(stream::iter(chunks)));

        assert_eq!(body.into_bytes().await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn stream_error_fails_the_drain() {
        let chunks: Vec<anyhow::Result<Vec<u8>>> =
            vec![Ok(b"partial".to_vec()), Err(anyhow::anyhow!("connection reset"))];
        let body = ResponseBody::Stream(Box::pin(stream::iter(chunks)));

        let err = body.into_bytes().await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn json_sets_content_type_and_status() {
        let resp = ResponseDescriptor::json(url(), &serde_json::json!({"a": 1})).unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.status_text, "OK");
        assert_eq!(
            resp.headers.get(CONTENT_TYPE).unwrap(),
            "application/json; charset=utf-8"
        );
        assert!(resp.is_ok());
    }

    #[test]
    fn non_standard_status_is_unknown() {
        let resp = ResponseDescriptor::new(url(), 599, Vec::new());
        assert_eq!(resp.status_text, "Unknown");
        assert!(!resp.is_ok());
    }
}
