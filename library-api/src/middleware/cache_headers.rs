//! Cache-Control and ETag headers with conditional GET support

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::config::CacheConfig;
use crate::error::Error;

/// Middleware state: the Cache-Control value for successful GETs
#[derive(Debug, Clone)]
pub struct HttpCacheHeaders {
    cache_control: HeaderValue,
}

impl HttpCacheHeaders {
    pub fn new(config: &CacheConfig) -> Result<Self, Error> {
        Ok(Self {
            cache_control: HeaderValue::from_str(&config.cache_control())?,
        })
    }

    /// Middleware function tagging responses and answering `If-None-Match`
    pub async fn middleware(
        State(headers): State<Self>,
        request: Request<Body>,
        next: Next,
    ) -> Result<Response, Error> {
        if request.method() != Method::GET {
            return Ok(next.run(request).await);
        }

        let if_none_match = request.headers().get(header::IF_NONE_MATCH).cloned();
        let response = next.run(request).await;
        if response.status() != StatusCode::OK {
            return Ok(response);
        }

        let (mut parts, body) = response.into_parts();
        let body = to_bytes(body, usize::MAX)
            .await
            .map_err(|e| Error::Internal(format!("Failed to buffer response body: {}", e)))?;

        let etag = HeaderValue::from_str(&entity_tag(&body))?;
        parts
            .headers
            .insert(header::CACHE_CONTROL, headers.cache_control.clone());
        parts.headers.insert(header::ETAG, etag.clone());

        if if_none_match.is_some_and(|value| matches_etag(&value, &etag)) {
            let mut not_modified = Response::new(Body::empty());
            *not_modified.status_mut() = StatusCode::NOT_MODIFIED;
            copy_validators(&parts.headers, not_modified.headers_mut());
            return Ok(not_modified);
        }

        Ok(Response::from_parts(parts, Body::from(body)))
    }
}

/// Strong entity tag over the body bytes
pub fn entity_tag(body: &[u8]) -> String {
    format!("\"{}\"", blake3::hash(body).to_hex())
}

fn matches_etag(if_none_match: &HeaderValue, etag: &HeaderValue) -> bool {
    let Ok(candidates) = if_none_match.to_str() else {
        return false;
    };
    let Ok(etag) = etag.to_str() else {
        return false;
    };
    candidates.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
    })
}

fn copy_validators(from: &HeaderMap, to: &mut HeaderMap) {
    for name in [header::ETAG, header::CACHE_CONTROL, header::VARY] {
        if let Some(value) = from.get(&name) {
            to.insert(name, value.clone());
        }
    }
}
