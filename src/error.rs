//! Error types for Apify API calls.
//!
//! Every failure is classified into an [`ErrorKind`] so callers can tell apart
//! problems with their own input, problems the client retried and gave up on,
//! and plain client errors returned by the API.

use http::{HeaderMap, StatusCode};
use serde::Deserialize;

/// Error type returned by the API when a record does not exist.
pub const RECORD_NOT_FOUND: &str = "record-not-found";

/// The main error type for Apify API calls.
///
/// # Examples
///
/// ```no_run
/// use apify_client::{ApifyClient, Error, ErrorKind};
///
/// # async fn example() -> Result<(), Error> {
/// let client = ApifyClient::builder().token("my-token").build()?;
///
/// match client.actor("apify/hello-world").get().await {
///     Ok(Some(actor)) => println!("Found actor {}", actor.name),
///     Ok(None) => println!("No such actor"),
///     Err(e) if e.kind() == ErrorKind::RetryBudgetExhausted => {
///         eprintln!("API kept failing: {}", e);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Caller input was malformed. No request was sent.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The client configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A network-level error raised by `reqwest` (connection refused, DNS, TLS...).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request timed out.
    #[error("Request timed out")]
    Timeout,

    /// A transport-level failure reported by a custom [`Transport`](crate::Transport).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The API answered with a non-2xx status code.
    ///
    /// `error_type` and `message` are taken from the `{"error": {...}}` body
    /// when the API sent one.
    #[error("HTTP error {status}: {}", .message.as_deref().unwrap_or(.raw_response.as_str()))]
    HttpError {
        /// The HTTP status code
        status: StatusCode,
        /// Machine-readable error type, e.g. `record-not-found`
        error_type: Option<String>,
        /// Human readable message from the API
        message: Option<String>,
        /// The raw response body
        raw_response: String,
        /// The response headers
        headers: HeaderMap,
        /// Rate limit information parsed from headers (429 responses only)
        rate_limit_info: Option<crate::rate_limit::RateLimitInfo>,
    },

    /// A retryable failure persisted after every retry was spent.
    #[error("Retry budget exhausted after {attempts} attempts: {last_error}")]
    RetryBudgetExhausted {
        /// The number of attempts made
        attempts: usize,
        /// The last error encountered
        last_error: Box<Error>,
    },

    /// The operation is disabled for this resource collection.
    #[error("Operation `{operation}` is not supported for resource `{resource}`")]
    NotSupported {
        /// The disabled operation
        operation: &'static str,
        /// The resource path of the collection
        resource: String,
    },

    /// Failed to serialize the request body.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// Failed to deserialize the response body into the expected type.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed caller input or configuration.
    Validation,
    /// The API answered 429.
    RateLimit,
    /// The API answered 5xx.
    Server,
    /// The request never produced an HTTP response.
    Transport,
    /// Any other non-2xx answer.
    Client,
    /// Retries were spent without success.
    RetryBudgetExhausted,
    /// The operation is disabled for the resource.
    NotSupported,
    /// A body could not be encoded or decoded.
    Decode,
}

impl Error {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) | Error::ConfigurationError(_) | Error::InvalidUrl(_) => {
                ErrorKind::Validation
            }
            Error::Network(_) | Error::Timeout | Error::Transport(_) => ErrorKind::Transport,
            Error::HttpError { status, .. } if *status == StatusCode::TOO_MANY_REQUESTS => {
                ErrorKind::RateLimit
            }
            Error::HttpError { status, .. } if status.is_server_error() => ErrorKind::Server,
            Error::HttpError { .. } => ErrorKind::Client,
            Error::RetryBudgetExhausted { .. } => ErrorKind::RetryBudgetExhausted,
            Error::NotSupported { .. } => ErrorKind::NotSupported,
            Error::SerializationFailed(_) | Error::DeserializationFailed { .. } => ErrorKind::Decode,
        }
    }

    /// Returns `true` for 404 responses whose error type is `record-not-found`.
    ///
    /// Resource clients turn these into `Ok(None)` / `Ok(())`.
    pub fn is_record_not_found(&self) -> bool {
        matches!(
            self,
            Error::HttpError { status, error_type: Some(kind), .. }
                if *status == StatusCode::NOT_FOUND && kind == RECORD_NOT_FOUND
        )
    }

    /// Returns the HTTP status code if this error has one.
    ///
    /// For [`Error::RetryBudgetExhausted`] this is the status of the last attempt.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::HttpError { status, .. } => Some(*status),
            Error::DeserializationFailed { status, .. } => Some(*status),
            Error::RetryBudgetExhausted { last_error, .. } => last_error.status(),
            _ => None,
        }
    }

    /// Returns the machine-readable error type sent by the API, if any.
    pub fn error_type(&self) -> Option<&str> {
        match self {
            Error::HttpError { error_type, .. } => error_type.as_deref(),
            Error::RetryBudgetExhausted { last_error, .. } => last_error.error_type(),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::HttpError { raw_response, .. } => Some(raw_response),
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            Error::RetryBudgetExhausted { last_error, .. } => last_error.raw_response(),
            _ => None,
        }
    }

    /// Returns rate limit information if available.
    pub fn rate_limit_info(&self) -> Option<&crate::rate_limit::RateLimitInfo> {
        match self {
            Error::HttpError {
                rate_limit_info, ..
            } => rate_limit_info.as_ref(),
            Error::RetryBudgetExhausted { last_error, .. } => last_error.rate_limit_info(),
            _ => None,
        }
    }

    /// Builds an [`Error::HttpError`] from a non-2xx response, extracting the
    /// error envelope when the body carries one.
    pub(crate) fn from_response(status: StatusCode, headers: HeaderMap, raw_response: String) -> Self {
        #[derive(Deserialize)]
        struct ErrorEnvelope {
            error: ErrorBody,
        }

        #[derive(Deserialize)]
        struct ErrorBody {
            #[serde(rename = "type")]
            error_type: Option<String>,
            message: Option<String>,
        }

        let (error_type, message) = match serde_json::from_str::<ErrorEnvelope>(&raw_response) {
            Ok(envelope) => (envelope.error.error_type, envelope.error.message),
            Err(_) => (None, None),
        };

        let rate_limit_info = if status == StatusCode::TOO_MANY_REQUESTS {
            Some(crate::rate_limit::RateLimitInfo::from_headers(&headers))
        } else {
            None
        };

        Error::HttpError {
            status,
            error_type,
            message,
            raw_response,
            headers,
            rate_limit_info,
        }
    }
}

/// A specialized `Result` type for Apify API calls.
pub type Result<T> = std::result::Result<T, Error>;
