//! Router assembly
//!
//! Request path through the service middleware, outermost first:
//! rate limiting, HTTP cache headers, response cache, handler.
//! `/health` bypasses all three.

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::health::health;
use crate::middleware::{HttpCacheHeaders, RateLimit, ResponseCache};
use crate::repository::LibraryRepository;
use crate::state::AppState;

/// Every API route, bound to `state`
pub fn router<R: LibraryRepository>(state: AppState<R>) -> Router {
    let api = Router::new()
        .route("/api", get(handlers::get_root))
        .route(
            "/api/authors",
            get(handlers::get_authors::<R>)
                .post(handlers::create_author::<R>)
                .options(handlers::authors_options),
        )
        .route(
            "/api/authors/{id}",
            get(handlers::get_author::<R>)
                .post(handlers::block_author_creation::<R>)
                .delete(handlers::delete_author::<R>),
        )
        .route(
            "/api/authors/{author_id}/books",
            get(handlers::get_books_for_author::<R>).post(handlers::create_book_for_author::<R>),
        )
        .route(
            "/api/authors/{author_id}/books/{id}",
            get(handlers::get_book_for_author::<R>)
                .put(handlers::update_book_for_author::<R>)
                .patch(handlers::partially_update_book_for_author::<R>)
                .delete(handlers::delete_book_for_author::<R>),
        )
        .route(
            "/api/authorcollections",
            post(handlers::create_author_collection::<R>),
        )
        .route(
            "/api/{resource_set}",
            get(handlers::get_author_collection::<R>),
        )
        .layer(from_fn_with_state(
            state.response_cache().clone(),
            ResponseCache::middleware,
        ))
        .layer(from_fn_with_state(
            state.cache_headers().clone(),
            HttpCacheHeaders::middleware,
        ))
        .layer(from_fn_with_state(
            state.rate_limit().clone(),
            RateLimit::middleware,
        ));

    api.route("/health", get(health::<R>)).with_state(state)
}
