//! In-process cache of successful GET responses
//!
//! Entries are keyed by method, `Host`, path with query and the `Accept`
//! header, and expire after a fixed TTL. Links in a body are built from the
//! `Host` header, so it belongs to the key. A successful POST, PUT, PATCH or
//! DELETE clears the whole cache so clients read their own writes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use bytes::Bytes;
use dashmap::DashMap;

use crate::config::CacheConfig;
use crate::error::Error;

/// Header telling whether a response came from the cache
pub const CACHE_STATUS_HEADER: &str = "x-cache";

#[derive(Debug, Clone)]
struct CachedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    stored_at: Instant,
}

impl CachedResponse {
    fn to_response(&self) -> Response {
        let mut response = Response::new(Body::from(self.body.clone()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers.clone();
        response
            .headers_mut()
            .insert(CACHE_STATUS_HEADER, HeaderValue::from_static("HIT"));
        response
    }
}

/// TTL cache of rendered responses
#[derive(Debug, Clone)]
pub struct ResponseCache {
    enabled: bool,
    ttl: Duration,
    entries: Arc<DashMap<String, CachedResponse>>,
    // Bumped by every clear; a response rendered before a clear is not stored
    generation: Arc<AtomicU64>,
}

impl ResponseCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            enabled: config.response_cache_enabled,
            ttl: config.response_cache_ttl(),
            entries: Arc::new(DashMap::new()),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ttl: Duration::ZERO,
            entries: Arc::new(DashMap::new()),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    fn key(request: &Request<Body>) -> String {
        let header_value = |name: HeaderName| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
        };
        format!(
            "{} {} {} {}",
            request.method(),
            header_value(header::HOST),
            request.uri(),
            header_value(header::ACCEPT)
        )
    }

    fn invalidates(method: &Method) -> bool {
        matches!(*method, Method::POST | Method::PUT | Method::PATCH | Method::DELETE)
    }

    fn get(&self, key: &str) -> Option<Response> {
        let entry = self.entries.get(key)?;
        if entry.stored_at.elapsed() < self.ttl {
            return Some(entry.to_response());
        }
        // Expired; release the read guard before removing
        drop(entry);
        self.entries.remove(key);
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.entries.clear();
    }

    /// Remove expired entries
    pub fn evict_expired(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
    }

    /// Middleware function serving and filling the cache
    pub async fn middleware(
        State(cache): State<Self>,
        request: Request<Body>,
        next: Next,
    ) -> Result<Response, Error> {
        if !cache.enabled {
            return Ok(next.run(request).await);
        }

        if request.method() != Method::GET {
            let invalidates = Self::invalidates(request.method());
            let response = next.run(request).await;
            if invalidates && response.status().is_success() {
                tracing::debug!(entries = cache.len(), "Write succeeded, clearing response cache");
                cache.clear();
            }
            return Ok(response);
        }

        let key = Self::key(&request);
        if let Some(response) = cache.get(&key) {
            tracing::debug!(key = %key, "Response cache hit");
            return Ok(response);
        }

        let generation = cache.generation.load(Ordering::SeqCst);
        let response = next.run(request).await;
        if response.status() != StatusCode::OK {
            return Ok(response);
        }

        let (mut parts, body) = response.into_parts();
        let body = to_bytes(body, usize::MAX)
            .await
            .map_err(|e| Error::Internal(format!("Failed to buffer response body: {}", e)))?;

        let entry = CachedResponse {
            status: parts.status,
            headers: parts.headers.clone(),
            body: body.clone(),
            stored_at: Instant::now(),
        };
        // Hold the shard lock while checking, so a concurrent clear either
        // sees this entry or bumps the generation first
        let slot = cache.entries.entry(key);
        if cache.generation.load(Ordering::SeqCst) == generation {
            slot.insert(entry);
        } else {
            tracing::debug!("Cache cleared while rendering, response not stored");
        }

        parts
            .headers
            .insert(CACHE_STATUS_HEADER, HeaderValue::from_static("MISS"));
        Ok(Response::from_parts(parts, Body::from(body)))
    }
}
