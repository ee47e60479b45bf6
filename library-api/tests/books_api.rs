mod common;

use axum::http::{header, StatusCode};
use common::*;
use uuid::Uuid;

fn books_uri(author_id: &str) -> String {
    format!("/api/authors/{}/books", author_id)
}

fn book_uri(author_id: &str, id: &str) -> String {
    format!("/api/authors/{}/books/{}", author_id, id)
}

#[tokio::test]
async fn books_are_listed_by_title() {
    let app = seeded_app();
    let body = body_json(get(&app, &books_uri(STEPHEN_KING)).await).await;
    let titles: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["It", "Misery", "The Shining", "The Stand"]);
}

#[tokio::test]
async fn books_of_unknown_author_are_404() {
    let app = seeded_app();
    let response = get(&app, &books_uri("00000000-0000-0000-0000-000000000001")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn book_shaping_and_links() {
    let app = seeded_app();

    let body = body_json(
        get(
            &app,
            &format!("{}?fields=title", book_uri(STEPHEN_KING, THE_SHINING)),
        )
        .await,
    )
    .await;
    assert_eq!(body, serde_json::json!({ "title": "The Shining" }));

    let body = body_json(get_accept(&app, &books_uri(STEPHEN_KING), HATEOAS).await).await;
    assert_eq!(body["value"].as_array().unwrap().len(), 4);
    assert_eq!(body["value"][0]["links"][3]["rel"], "partially_update_book");
    assert_eq!(body["links"][0]["href"], books_uri(STEPHEN_KING));

    let response = get(&app, &format!("{}?fields=isbn", books_uri(STEPHEN_KING))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_book() {
    let app = seeded_app();
    let response = send_json(
        &app,
        "POST",
        &books_uri(NEIL_GAIMAN),
        "application/json",
        r#"{"title":"Coraline","description":"A door to another world."}"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let location = response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string();
    let body = body_json(response).await;
    assert_eq!(body["authorId"], NEIL_GAIMAN);
    assert_eq!(
        location,
        book_uri(NEIL_GAIMAN, body["id"].as_str().unwrap())
    );

    let response = get(&app, &location).await;
    assert_eq!(body_json(response).await["title"], "Coraline");
}

#[tokio::test]
async fn title_equal_to_description_is_422() {
    let app = seeded_app();
    let response = send_json(
        &app,
        "POST",
        &books_uri(NEIL_GAIMAN),
        "application/json",
        r#"{"title":"Stardust","description":"Stardust"}"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["status"], 422);
    assert_eq!(body["errors"][0]["field"], "description");
    assert_eq!(
        body["errors"][0]["message"],
        "Description should be different from Title."
    );
}

#[tokio::test]
async fn field_rules_are_422() {
    let app = seeded_app();
    let long_title = "x".repeat(101);
    let response = send_json(
        &app,
        "POST",
        &books_uri(NEIL_GAIMAN),
        "application/json",
        format!(r#"{{"title":"{}"}}"#, long_title),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["errors"][0]["field"], "title");
}

#[tokio::test]
async fn book_for_unknown_author_is_404() {
    let app = seeded_app();
    let response = send_json(
        &app,
        "POST",
        &books_uri("00000000-0000-0000-0000-000000000001"),
        "application/json",
        r#"{"title":"Orphan","description":"No author."}"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_book_body_is_400() {
    let app = seeded_app();
    let response = send_json(&app, "POST", &books_uri(NEIL_GAIMAN), "application/json", "").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn put_on_missing_book_creates_it() {
    let app = seeded_app();
    let id = Uuid::new_v4().to_string();
    let response = send_json(
        &app,
        "PUT",
        &book_uri(NEIL_GAIMAN, &id),
        "application/json",
        r#"{"title":"Neverwhere","description":"London Below."}"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers()[header::LOCATION],
        book_uri(NEIL_GAIMAN, &id).as_str()
    );
    assert_eq!(body_json(response).await["id"], id);

    let response = get(&app, &book_uri(NEIL_GAIMAN, &id)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn put_on_existing_book_updates_it() {
    let app = seeded_app();
    let uri = book_uri(STEPHEN_KING, THE_SHINING);

    // Warm the response cache so the update has to invalidate it
    assert_eq!(body_json(get(&app, &uri).await).await["title"], "The Shining");

    let response = send_json(
        &app,
        "PUT",
        &uri,
        "application/json",
        r#"{"title":"The Shining (revised)","description":"Still haunted."}"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(response).await.is_empty());

    let body = body_json(get(&app, &uri).await).await;
    assert_eq!(body["title"], "The Shining (revised)");
    assert_eq!(body["description"], "Still haunted.");
}

#[tokio::test]
async fn put_requires_a_description() {
    let app = seeded_app();
    let response = send_json(
        &app,
        "PUT",
        &book_uri(STEPHEN_KING, THE_SHINING),
        "application/json",
        r#"{"title":"The Shining"}"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn patch_existing_book() {
    let app = seeded_app();
    let uri = book_uri(STEPHEN_KING, THE_SHINING);
    let response = send_json(
        &app,
        "PATCH",
        &uri,
        "application/json-patch+json",
        r#"[{"op":"replace","path":"/title","value":"Shining"}]"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = body_json(get(&app, &uri).await).await;
    assert_eq!(body["title"], "Shining");
    assert_eq!(
        body["description"],
        "A winter caretaker and his family are alone in a haunted hotel."
    );
}

#[tokio::test]
async fn patch_on_missing_book_creates_it() {
    let app = seeded_app();
    let id = Uuid::new_v4().to_string();
    let response = send_json(
        &app,
        "PATCH",
        &book_uri(NEIL_GAIMAN, &id),
        "application/json-patch+json",
        r#"[
            {"op":"replace","path":"/title","value":"Good Omens"},
            {"op":"replace","path":"/description","value":"The end of the world, postponed."}
        ]"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers()[header::LOCATION],
        book_uri(NEIL_GAIMAN, &id).as_str()
    );
    assert_eq!(body_json(response).await["title"], "Good Omens");
}

#[tokio::test]
async fn patch_breaking_rules_is_422() {
    let app = seeded_app();
    let response = send_json(
        &app,
        "PATCH",
        &book_uri(STEPHEN_KING, THE_SHINING),
        "application/json-patch+json",
        r#"[
            {"op":"replace","path":"/title","value":"Same"},
            {"op":"replace","path":"/description","value":"Same"}
        ]"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = send_json(
        &app,
        "PATCH",
        &book_uri(STEPHEN_KING, THE_SHINING),
        "application/json-patch+json",
        r#"[{"op":"remove","path":"/isbn"}]"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["errors"][0]["field"], "patchDoc");
}

#[tokio::test]
async fn patch_must_be_json() {
    let app = seeded_app();
    let response = send_json(
        &app,
        "PATCH",
        &book_uri(STEPHEN_KING, THE_SHINING),
        "application/xml",
        "<patch/>",
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn delete_book() {
    let app = seeded_app();
    let uri = book_uri(STEPHEN_KING, THE_SHINING);

    let response = send_json(&app, "DELETE", &uri, "application/json", "").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(&app, &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send_json(&app, "DELETE", &uri, "application/json", "").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
