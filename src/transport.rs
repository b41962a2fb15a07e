//! The transport boundary: one physical HTTP exchange.
//!
//! [`HttpClient`](crate::HttpClient) owns retries, statistics and error
//! classification; a [`Transport`] only sends a request and reports what came
//! back. The default implementation is [`ReqwestTransport`].

use crate::request::RequestBody;
use crate::{Error, Result};
use async_trait::async_trait;
use http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use std::time::Duration;
use url::Url;

/// A fully resolved request, query string included in `url`.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// The HTTP method.
    pub method: Method,
    /// Absolute URL including the query string.
    pub url: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// Optional body.
    pub body: Option<RequestBody>,
    /// Whether a JSON response is expected.
    pub json: bool,
    /// Per-attempt timeout.
    pub timeout: Option<Duration>,
}

/// What the server answered, whatever the status.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body as text.
    pub body: String,
}

/// Sends a single HTTP request.
///
/// Implementations must return `Ok` for every response the server produced,
/// including 4xx and 5xx, and reserve `Err` for failures where no response was
/// obtained ([`Error::Network`], [`Error::Timeout`] or [`Error::Transport`]).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs one attempt.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// [`Transport`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with a fresh connection pool.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("apify-client-rust/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self { client })
    }

    /// Wraps an existing `reqwest::Client`.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let mut builder = self.client.request(request.method, request.url);

        if request.json {
            builder = builder.header(header::ACCEPT, HeaderValue::from_static("application/json"));
        }

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        builder = match request.body {
            Some(RequestBody::Json(value)) => builder.json(&value),
            Some(RequestBody::Text(text)) => builder.body(text),
            None => builder,
        };

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(map_reqwest_error)?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

fn map_reqwest_error(error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::Timeout
    } else {
        Error::Network(error)
    }
}
