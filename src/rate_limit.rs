//! Rate limit details attached to 429 errors.
//!
//! The retry schedule is driven by [`RetryPolicy`](crate::RetryPolicy) alone; this
//! information is kept so callers inspecting an exhausted budget can see what the
//! API asked for.

use http::HeaderMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Information extracted from rate limit headers of a 429 response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// When the rate limit resets (from X-RateLimit-Reset or RateLimit-Reset headers).
    pub reset_at: Option<SystemTime>,

    /// How long the API asked us to wait (from Retry-After header).
    pub retry_after: Option<Duration>,

    /// Number of requests remaining in the current window.
    pub remaining: Option<u64>,
}

impl RateLimitInfo {
    /// Extracts rate limit information from HTTP response headers.
    ///
    /// Parses `Retry-After` (seconds or HTTP date), `X-RateLimit-Reset`,
    /// `RateLimit-Reset` and `X-RateLimit-Remaining`.
    ///
    /// # Examples
    ///
    /// ```
    /// use apify_client::rate_limit::RateLimitInfo;
    /// use http::HeaderMap;
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert("retry-after", "60".parse().unwrap());
    ///
    /// let info = RateLimitInfo::from_headers(&headers);
    /// assert_eq!(info.retry_after, Some(std::time::Duration::from_secs(60)));
    /// ```
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            reset_at: parse_rate_limit_reset(headers),
            retry_after: parse_retry_after(headers),
            remaining: parse_rate_limit_remaining(headers),
        }
    }
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let header = headers.get("retry-after")?.to_str().ok()?;

    if let Ok(seconds) = header.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let date_time = httpdate::parse_http_date(header).ok()?;
    date_time.duration_since(SystemTime::now()).ok()
}

fn parse_rate_limit_reset(headers: &HeaderMap) -> Option<SystemTime> {
    ["x-ratelimit-reset", "ratelimit-reset"]
        .iter()
        .filter_map(|name| headers.get(*name)?.to_str().ok()?.parse::<u64>().ok())
        .find_map(|timestamp| UNIX_EPOCH.checked_add(Duration::from_secs(timestamp)))
}

fn parse_rate_limit_remaining(headers: &HeaderMap) -> Option<u64> {
    headers
        .get("x-ratelimit-remaining")?
        .to_str()
        .ok()?
        .parse()
        .ok()
}
