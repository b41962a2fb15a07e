//! The retrying HTTP executor shared by every resource client.

use crate::request::RequestDescriptor;
use crate::retry::RetryPolicy;
use crate::statistics::Statistics;
use crate::transport::{Transport, TransportRequest};
use crate::{Error, Response, Result};
use http::StatusCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Executes [`RequestDescriptor`]s with retries and exponential backoff.
///
/// One `HttpClient` exists per [`ApifyClient`](crate::ApifyClient); cloning it
/// is cheap and every clone shares the same transport and [`Statistics`].
///
/// For each call:
/// - `calls` is incremented once, before anything else;
/// - every physical attempt increments `requests`;
/// - a 429 on attempt `n` increments `rate_limit_errors[n]`;
/// - retryable failures (see [`RetryPolicy::should_retry`]) are retried until
///   the budget is spent, then surface as [`Error::RetryBudgetExhausted`];
/// - other non-2xx answers are returned as [`Error::HttpError`] right away.
///   A 404 is not interpreted here.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<HttpClientInner>,
}

struct HttpClientInner {
    transport: Arc<dyn Transport>,
    api_url: Url,
    retry_policy: RetryPolicy,
    timeout: Option<Duration>,
    stats: Arc<Statistics>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("api_url", &self.inner.api_url.as_str())
            .field("retry_policy", &self.inner.retry_policy)
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Creates an executor. Relative descriptor URLs resolve against `api_url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationError`] if `api_url` cannot have path
    /// segments appended (e.g. `mailto:` or `data:` URLs).
    pub fn new(
        transport: Arc<dyn Transport>,
        api_url: Url,
        retry_policy: RetryPolicy,
        timeout: Option<Duration>,
        stats: Arc<Statistics>,
    ) -> Result<Self> {
        if api_url.cannot_be_a_base() {
            return Err(Error::ConfigurationError(format!(
                "`{}` cannot be used as an API root",
                api_url
            )));
        }

        Ok(Self {
            inner: Arc::new(HttpClientInner {
                transport,
                api_url,
                retry_policy,
                timeout,
                stats,
            }),
        })
    }

    /// The statistics updated by this executor.
    pub fn stats(&self) -> &Arc<Statistics> {
        &self.inner.stats
    }

    /// The API root relative URLs are resolved against.
    pub fn api_url(&self) -> &Url {
        &self.inner.api_url
    }

    /// The retry policy applied to every call.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.inner.retry_policy
    }

    /// Executes one logical request.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if the descriptor is malformed (nothing is sent);
    /// - [`Error::HttpError`] for non-retryable non-2xx answers;
    /// - [`Error::RetryBudgetExhausted`] when retryable failures outlast the budget.
    pub async fn call(&self, descriptor: RequestDescriptor) -> Result<Response> {
        self.inner.stats.add_call();

        descriptor.validate()?;
        let url = self.resolve_url(&descriptor)?;
        let policy = &self.inner.retry_policy;

        let start_time = Instant::now();
        let mut attempt = 0;

        loop {
            self.inner.stats.add_request();

            tracing::debug!(
                method = %descriptor.method,
                url = %redacted(&url),
                attempt = attempt,
                "Executing HTTP request"
            );

            let error = match self.attempt(&descriptor, &url).await {
                Ok(transport_response) if transport_response.status.is_success() => {
                    let latency = start_time.elapsed();
                    tracing::debug!(
                        status = transport_response.status.as_u16(),
                        latency_ms = latency.as_millis(),
                        attempts = attempt + 1,
                        "Received HTTP response"
                    );
                    return Ok(Response::new(
                        transport_response.body,
                        transport_response.status,
                        transport_response.headers,
                        latency,
                        attempt + 1,
                    ));
                }
                Ok(transport_response) => Error::from_response(
                    transport_response.status,
                    transport_response.headers,
                    transport_response.body,
                ),
                Err(e) => e,
            };

            if error.status() == Some(StatusCode::TOO_MANY_REQUESTS) {
                self.inner.stats.add_rate_limit_error(attempt);
            }

            if !policy.should_retry(&error) {
                tracing::error!(
                    error = %error,
                    method = %descriptor.method,
                    url = %redacted(&url),
                    "Request failed"
                );
                return Err(error);
            }

            if attempt >= policy.max_retries {
                tracing::info!(
                    error = %error,
                    attempts = attempt + 1,
                    url = %redacted(&url),
                    "Retry budget exhausted"
                );
                return Err(Error::RetryBudgetExhausted {
                    attempts: attempt + 1,
                    last_error: Box::new(error),
                });
            }

            let delay = policy.delay_for_attempt(attempt);
            tracing::warn!(
                error = %error,
                attempt = attempt,
                delay_ms = delay.as_millis(),
                "Retrying request after delay"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn attempt(
        &self,
        descriptor: &RequestDescriptor,
        url: &Url,
    ) -> Result<crate::transport::TransportResponse> {
        let request = TransportRequest {
            method: descriptor.method.clone(),
            url: url.clone(),
            headers: descriptor.headers.clone(),
            body: descriptor.body.clone(),
            json: descriptor.json,
            timeout: self.inner.timeout,
        };
        self.inner.transport.send(request).await
    }

    fn resolve_url(&self, descriptor: &RequestDescriptor) -> Result<Url> {
        let mut url = match Url::parse(&descriptor.url) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let mut base = self.inner.api_url.clone();
                if !base.path().ends_with('/') {
                    let path = format!("{}/", base.path());
                    base.set_path(&path);
                }
                base.join(descriptor.url.trim_start_matches('/'))?
            }
            Err(e) => return Err(Error::Validation(format!("Invalid request URL: {}", e))),
        };

        if !descriptor.params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in descriptor.params.to_pairs() {
                pairs.append_pair(&name, &value);
            }
        }

        Ok(url)
    }
}

/// Renders a URL without its query string so tokens never reach the logs.
fn redacted(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}
