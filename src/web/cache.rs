//! Response cache middleware
//!
//! Memoizes complete responses for selected routes. Entries are keyed by
//! host, path and query string, expire after the TTL configured for the
//! route they came from, and are bounded by an LRU capacity. Only 2xx and
//! 3xx responses are stored, so a failed stream resolution is retried on the
//! next request. A handler can shorten the TTL of a single response, or opt
//! it out entirely, by attaching a [`CacheTtl`] extension.

use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::errors::AppError;

/// A stored response
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    stored_at: Instant,
    ttl: Duration,
}

impl CachedResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes, ttl: Duration) -> Self {
        Self {
            status,
            headers,
            body,
            stored_at: Instant::now(),
            ttl,
        }
    }

    pub fn is_fresh(&self) -> bool {
        self.stored_at.elapsed() < self.ttl
    }

    /// Seconds left before expiry, for `Cache-Control: max-age`
    pub fn remaining(&self) -> Duration {
        self.ttl.saturating_sub(self.stored_at.elapsed())
    }

    fn to_response(&self) -> Response {
        let mut response = (self.status, self.body.clone()).into_response();
        *response.headers_mut() = self.headers.clone();
        set_max_age(response.headers_mut(), self.remaining());
        response
    }
}

/// Shared, bounded TTL cache of whole responses
#[derive(Clone)]
pub struct ResponseCache {
    entries: Arc<Mutex<LruCache<String, CachedResponse>>>,
}

impl ResponseCache {
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Fresh entry for `key`; expired entries are evicted on lookup
    pub async fn get(&self, key: &str) -> Option<CachedResponse> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.is_fresh() => Some(entry.clone()),
            Some(_) => {
                entries.pop(key);
                None
            }
            None => None,
        }
    }

    pub async fn insert(&self, key: String, response: CachedResponse) {
        self.entries.lock().await.put(key, response);
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Cache key for a request: host, path and query string
    pub fn key_for(request: &Request) -> String {
        let host = request
            .headers()
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let uri = request.uri();
        match uri.query() {
            Some(query) => format!("{host}{}?{query}", uri.path()),
            None => format!("{host}{}", uri.path()),
        }
    }
}

/// Per-response TTL set by a handler; capped by the route's policy TTL.
///
/// A zero TTL marks the response `no-store` and keeps it out of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtl(pub Duration);

/// Middleware state: the shared cache and the TTL for the wrapped routes
#[derive(Clone)]
pub struct CachePolicy {
    pub cache: ResponseCache,
    pub ttl: Duration,
}

impl CachePolicy {
    pub fn new(cache: ResponseCache, ttl: Duration) -> Self {
        Self { cache, ttl }
    }
}

/// Serve GET requests from the cache, storing successful responses on a miss
pub async fn cache_response(
    State(policy): State<CachePolicy>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::GET || policy.ttl.is_zero() {
        return next.run(request).await;
    }

    let key = ResponseCache::key_for(&request);
    if let Some(cached) = policy.cache.get(&key).await {
        debug!(key = %key, "Serving response from cache");
        return cached.to_response();
    }

    let mut response = next.run(request).await;
    let status = response.status();
    if !(status.is_success() || status.is_redirection()) {
        return response;
    }

    let ttl = response
        .extensions()
        .get::<CacheTtl>()
        .map_or(policy.ttl, |CacheTtl(ttl)| (*ttl).min(policy.ttl));

    if ttl.is_zero() {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        debug!(key = %key, "Response opted out of caching");
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let body = match to_bytes(body, usize::MAX).await {
        Ok(body) => body,
        Err(e) => {
            warn!(key = %key, error = %e, "Failed to buffer response for caching");
            return AppError::internal("Failed to read response body").into_response();
        }
    };

    set_max_age(&mut parts.headers, ttl);
    policy
        .cache
        .insert(
            key,
            CachedResponse::new(status, parts.headers.clone(), body.clone(), ttl),
        )
        .await;

    Response::from_parts(parts, Body::from(body))
}

fn set_max_age(headers: &mut HeaderMap, ttl: Duration) {
    if let Ok(value) = HeaderValue::from_str(&format!("public, max-age={}", ttl.as_secs())) {
        headers.insert(header::CACHE_CONTROL, value);
    }
}
