use crate::net::response::reason_phrase;
use crate::net::{RequestDescriptor, ResponseBody, ResponseDescriptor};
use async_trait::async_trait;
use http::{HeaderMap, HeaderName, HeaderValue};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Net(#[from] reqwest::Error),
    #[error("invalid request header: {0}")]
    InvalidHeader(String),
    #[error("request refused: {0}")]
    Refused(String),
}

/// Performs a single, fully buffered exchange for a request.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: RequestDescriptor) -> Result<ResponseDescriptor, FetchError>;
}

/// Fetcher backed by a shared `reqwest` client.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    // Loads an URL and returns the response in a result if any
    async fn fetch(&self, request: RequestDescriptor) -> Result<ResponseDescriptor, FetchError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| FetchError::InvalidHeader(name.clone()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| FetchError::InvalidHeader(name.to_string()))?;
            headers.append(name, value);
        }

        let mut builder = self.client.request(request.method, request.url).headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        let res = builder.send().await?;

        // Fetch results
        let final_url = res.url().clone();
        let status = res.status().as_u16();
        let status_text = res.status().canonical_reason().unwrap_or("Unknown").to_string();
        let headers = res.headers().clone();

        // Fetch body. We don't do streaming yet
        let body = res.bytes().await?.to_vec();

        Ok(ResponseDescriptor {
            url: final_url,
            status,
            status_text,
            headers,
            body: ResponseBody::Buffered(body),
        })
    }
}

/// Fetcher that never touches the network.
///
/// Every request is answered with the same status and body, reported at the
/// request's own URL. A failing instance rejects every request instead, which
/// looks like a network error to the caller.
#[derive(Clone, Debug)]
pub struct NullFetcher {
    status: u16,
    status_text: String,
    body: Vec<u8>,
    fail: bool,
}

impl NullFetcher {
    /// Answers `200 OK` with an empty body.
    pub fn new() -> Self {
        Self::with_response(200, Vec::new())
    }

    pub fn with_response(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            status_text: reason_phrase(status),
            body: body.into(),
            fail: false,
        }
    }

    /// Rejects every request.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }
}

impl Default for NullFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for NullFetcher {
    async fn fetch(&self, request: RequestDescriptor) -> Result<ResponseDescriptor, FetchError> {
        if self.fail {
            return Err(FetchError::Refused(request.url.to_string()));
        }

        Ok(ResponseDescriptor {
            url: request.url,
            status: self.status,
            status_text: self.status_text.clone(),
            headers: HeaderMap::new(),
            body: ResponseBody::Buffered(self.body.clone()),
        })
    }
}
