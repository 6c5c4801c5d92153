//! Fixed-window rate limiting middleware

use crate::clock::{Clock, SharedClock, SystemClock};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use parking_lot::Mutex;
use rand::Rng;
use serde_json::json;
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;
use tracing::{debug, warn};

pub const UNKNOWN_CLIENT: &str = "unknown";

/// Caller identity used as the rate-limit key. Taken from the first entry of
/// `X-Forwarded-For`, which any client can forge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey(pub String);

impl ClientKey {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let key = headers
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(UNKNOWN_CLIENT);

        Self(key.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientKey
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientKey::from_headers(&parts.headers))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRecord {
    pub count: u32,
    pub reset_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: i64,
}

#[derive(Clone)]
pub struct RateLimiter {
    records: Arc<Mutex<HashMap<String, RateLimitRecord>>>,
    rejected: Arc<AtomicU64>,
    max_requests: u32,
    window: Duration,
    cleanup_probability: f64,
    clock: SharedClock,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            rejected: Arc::new(AtomicU64::new(0)),
            max_requests,
            window,
            cleanup_probability: 0.1,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Out-of-range values are clamped; NaN disables cleanup.
    pub fn with_cleanup_probability(mut self, probability: f64) -> Self {
        self.cleanup_probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        self
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn allow(&self, key: &str) -> bool {
        self.check(key).is_ok()
    }

    /// Counts one request against `key`. The reset-or-increment decision
    /// happens under a single lock acquisition.
    pub fn check(&self, key: &str) -> Result<RateLimitStatus, RateLimitError> {
        let now = self.clock.now_millis();
        let window_ms = self.window.as_millis() as i64;

        let result = {
            let mut records = self.records.lock();

            let record = records
                .entry(key.to_string())
                .or_insert(RateLimitRecord { count: 0, reset_at: now + window_ms });

            if record.count == 0 || now > record.reset_at {
                record.count = 1;
                record.reset_at = now + window_ms;
                Ok(self.status(record))
            } else if record.count >= self.max_requests {
                Err(RateLimitError {
                    retry_after_seconds: retry_after_seconds(record.reset_at - now),
                    limit: self.max_requests,
                    remaining: 0,
                })
            } else {
                record.count += 1;
                Ok(self.status(record))
            }
        };

        if self.cleanup_probability > 0.0 && rand::thread_rng().gen_bool(self.cleanup_probability) {
            self.purge_expired();
        }

        if result.is_err() {
            self.rejected.fetch_add(1, Ordering::Relaxed);
        }

        result
    }

    /// Current record for `key` without counting a request.
    pub fn record(&self, key: &str) -> Option<RateLimitRecord> {
        self.records.lock().get(key).copied()
    }

    /// Drops every record whose window has passed; returns how many went.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_millis();
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|_, record| now <= record.reset_at);
        let purged = before - records.len();

        if purged > 0 {
            debug!(purged, remaining = records.len(), "purged expired rate limit records");
        }
        purged
    }

    pub fn tracked_clients(&self) -> usize {
        self.records.lock().len()
    }

    pub fn rejected_total(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    fn status(&self, record: &RateLimitRecord) -> RateLimitStatus {
        RateLimitStatus {
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(record.count),
            reset_at: record.reset_at,
        }
    }
}

fn retry_after_seconds(remaining_ms: i64) -> u64 {
    let ms = remaining_ms.max(0) as u64;
    ms.div_ceil(1000).max(1)
}

#[derive(Debug)]
pub struct RateLimitError {
    pub retry_after_seconds: u64,
    pub limit: u32,
    pub remaining: u32,
}

impl fmt::Display for RateLimitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rate limit of {} requests exceeded, retry after {}s",
            self.limit, self.retry_after_seconds
        )
    }
}

impl std::error::Error for RateLimitError {}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": "Too many requests. Please try again later.",
            "retry_after": self.retry_after_seconds,
            "status": StatusCode::TOO_MANY_REQUESTS.as_u16(),
        }));

        let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();

        let headers = response.headers_mut();
        headers.insert("X-RateLimit-Limit", HeaderValue::from(self.limit));
        headers.insert("X-RateLimit-Remaining", HeaderValue::from(self.remaining));
        headers.insert("Retry-After", HeaderValue::from(self.retry_after_seconds));

        response
    }
}

pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    client: ClientKey,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    let status = limiter.check(client.as_str()).map_err(|err| {
        warn!(
            client = %client,
            path = %request.uri().path(),
            retry_after = err.retry_after_seconds,
            "rate limit exceeded"
        );
        err
    })?;

    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Limit", HeaderValue::from(status.limit));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(status.remaining));

    Ok(response)
}
