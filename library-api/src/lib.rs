//! # library-api
//!
//! REST API over authors and the books they wrote.
//!
//! ## Features
//!
//! - **Paging**: `pageNumber`/`pageSize` with an `X-Pagination` metadata header
//! - **Sorting**: `orderBy` clauses resolved through a typed property mapping
//! - **Field shaping**: `fields` reduces every representation to a subset
//! - **Content negotiation**: plain JSON, XML, or a hypermedia envelope with links
//! - **Upserts**: PUT and JSON Patch create books at client-chosen ids
//! - **Middleware**: per-client rate limiting, ETag/Cache-Control, response caching,
//!   request ids, panic recovery, graceful shutdown
//!
//! ## Example
//!
//! ```rust,no_run
//! use library_api::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let state = AppState::new(config.clone(), InMemoryLibraryRepository::seeded())?;
//!     let app = router(state);
//!
//!     Server::new(config).serve(app).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repository;
pub mod responses;
pub mod routes;
pub mod server;
pub mod shaping;
pub mod sorting;
pub mod state;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{
        CacheConfig, Config, MiddlewareConfig, PagingConfig, RateLimitConfig, RateLimitRule,
        ServiceConfig, StorageConfig,
    };
    pub use crate::error::{Error, ErrorResponse, Result};
    pub use crate::handlers::{
        LinkBuilder, LinkDto, OutputFormat, HATEOAS_MEDIA_TYPE, JSON_MEDIA_TYPE, XML_MEDIA_TYPE,
        X_PAGINATION,
    };
    pub use crate::health::health;
    pub use crate::middleware::{
        request_id_layer, request_id_propagation_layer, sensitive_headers_layer, HttpCacheHeaders,
        RateLimit, ResponseCache, SENSITIVE_HEADERS,
    };
    pub use crate::models::{
        Author, AuthorDto, Book, BookDto, CreateAuthorDto, CreateAuthorWithDateOfDeathDto,
        CreateBookDto, UpdateBookDto,
    };
    pub use crate::observability::init_tracing;
    pub use crate::repository::{
        AuthorsQuery, InMemoryLibraryRepository, LibraryRepository, PagedList, RepositoryError,
    };
    pub use crate::responses::{FieldError, NoContent, ValidationError};
    pub use crate::routes::router;
    pub use crate::server::{apply_middleware, spawn_maintenance, Server, MAINTENANCE_INTERVAL};
    pub use crate::shaping::{shape, ShapedFields};
    pub use crate::sorting::{build_sort, PropertyMappingService};
    pub use crate::state::AppState;

    pub use axum::{
        extract::{Path, Query, State},
        routing::{delete, get, patch, post, put},
        Json, Router,
    };
}
