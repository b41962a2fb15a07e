//! Successful HTTP responses and the `data` envelope.
//!
//! The [`Response`] type keeps the raw body along with metadata about the
//! HTTP exchange, so callers decide how to decode it: unwrap the API's
//! `{"data": ...}` envelope, parse the body as-is, or keep it as text.

use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// A successful (2xx) HTTP response.
///
/// # Examples
///
/// ```
/// # use apify_client::Response;
/// # use http::{HeaderMap, StatusCode};
/// # use std::time::Duration;
/// let response = Response::new(
///     r#"{"data":{"id":"abc"}}"#.to_string(),
///     StatusCode::OK,
///     HeaderMap::new(),
///     Duration::from_millis(12),
///     1,
/// );
///
/// let data: serde_json::Value = response.into_data().unwrap();
/// assert_eq!(data["id"], "abc");
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    /// The raw response body as a string.
    pub raw_body: String,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from the first attempt until this response arrived, backoff sleeps included.
    pub latency: Duration,

    /// The number of attempts made to obtain this response.
    pub attempts: usize,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

impl Response {
    /// Creates a new `Response`.
    pub fn new(
        raw_body: String,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
        attempts: usize,
    ) -> Self {
        Self {
            raw_body,
            status,
            headers,
            latency,
            attempts,
        }
    }

    /// Parses the whole body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> crate::Result<T> {
        serde_json::from_str(&self.raw_body).map_err(|e| self.decode_error(e))
    }

    /// Parses the body and returns the payload nested under `data`.
    pub fn into_data<T: DeserializeOwned>(self) -> crate::Result<T> {
        serde_json::from_str::<Envelope<T>>(&self.raw_body)
            .map(|envelope| envelope.data)
            .map_err(|e| self.decode_error(e))
    }

    /// Returns the body as text.
    pub fn into_text(self) -> String {
        self.raw_body
    }

    /// Returns `true` if the request required retries.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Returns a reference to a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    fn decode_error(&self, error: serde_json::Error) -> crate::Error {
        tracing::error!(
            error = %error,
            status = self.status.as_u16(),
            "Failed to deserialize response"
        );
        crate::Error::DeserializationFailed {
            raw_response: self.raw_body.clone(),
            serde_error: error.to_string(),
            status: self.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: &str) -> Response {
        Response::new(
            body.to_string(),
            StatusCode::OK,
            HeaderMap::new(),
            Duration::ZERO,
            1,
        )
    }

    #[test]
    fn test_missing_envelope_is_decode_error() {
        let result = response(r#"{"id":"abc"}"#).into_data::<serde_json::Value>();

        match result {
            Err(crate::Error::DeserializationFailed { raw_response, .. }) => {
                assert_eq!(raw_response, r#"{"id":"abc"}"#);
            }
            other => panic!("Expected DeserializationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_json_reads_whole_body() {
        let value: serde_json::Value = response(r#"{"id":"abc"}"#).json().unwrap();
        assert_eq!(value["id"], "abc");
    }
}
