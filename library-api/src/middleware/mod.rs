//! Middleware for request tracking, rate limiting and HTTP caching

pub mod cache_headers;
pub mod rate_limit;
pub mod request_tracking;
pub mod response_cache;

pub use cache_headers::{entity_tag, HttpCacheHeaders};
pub use rate_limit::{client_key, RateLimit};
pub use request_tracking::{
    request_id_layer, request_id_propagation_layer, sensitive_headers_layer, MakeUuidRequestId,
    REQUEST_ID_HEADER, SENSITIVE_HEADERS,
};
pub use response_cache::{ResponseCache, CACHE_STATUS_HEADER};
