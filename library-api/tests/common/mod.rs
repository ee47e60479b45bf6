#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use chrono::NaiveDate;
use library_api::config::Config;
use library_api::models::Author;
use library_api::repository::InMemoryLibraryRepository;
use library_api::routes::router;
use library_api::state::AppState;
use tower::ServiceExt;
use uuid::Uuid;

pub const STEPHEN_KING: &str = "25320c5e-f58a-4b1f-b63a-8ee07a840bdf";
pub const THE_SHINING: &str = "c7ba6add-09c4-45f8-8dd0-eaca221e5d93";
pub const NEIL_GAIMAN: &str = "412c3012-d891-4f5e-9613-ff7aa63e6bb3";
pub const JENS_LAPIDUS: &str = "a1da1d8e-1988-4634-b538-a01709477b77";

pub const HATEOAS: &str = "application/vnd.marvin.hateoas+json";

/// Router over the seeded store with default configuration
pub fn seeded_app() -> Router {
    app_with(Config::default(), Arc::new(InMemoryLibraryRepository::seeded()))
}

pub fn app_with(config: Config, repository: Arc<InMemoryLibraryRepository>) -> Router {
    router(AppState::with_repository(config, repository).unwrap())
}

/// `count` authors named `Author00 Surname00`, `Author01 Surname01`, ...
pub fn numbered_authors(count: usize) -> Vec<Author> {
    (0..count)
        .map(|i| Author {
            id: Uuid::new_v4(),
            first_name: format!("Author{:02}", i),
            last_name: format!("Surname{:02}", i),
            date_of_birth: NaiveDate::from_ymd_opt(1950, 1, 1).unwrap(),
            date_of_death: None,
            genre: "Poetry".to_string(),
            books: Vec::new(),
        })
        .collect()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_accept(app: &Router, uri: &str, accept: &str) -> Response<Body> {
    send(
        app,
        Request::get(uri)
            .header("accept", accept)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    content_type: &str,
    body: impl Into<String>,
) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", content_type)
            .body(Body::from(body.into()))
            .unwrap(),
    )
    .await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub fn pagination(response: &Response<Body>) -> serde_json::Value {
    let header = response.headers()["x-pagination"].to_str().unwrap();
    serde_json::from_str(header).unwrap()
}
