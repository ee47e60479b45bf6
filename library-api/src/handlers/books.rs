//! Book endpoints, nested under their author
//!
//! PUT and PATCH create the book at the client-supplied id when it does not
//! exist yet (201), and update it otherwise (204).

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use uuid::Uuid;

use super::body::{parse_body, parse_json_body};
use super::links::LinkBuilder;
use super::negotiation::{LinkedResource, Negotiated, OutputFormat, Renderer};
use super::params::{path_error, query_error, ShapeParameters};
use crate::error::{Error, Result};
use crate::models::{Book, BookDto, BookForManipulation, CreateBookDto, UpdateBookDto};
use crate::repository::LibraryRepository;
use crate::responses::{NoContent, Representation, ValidationError};
use crate::shaping::{fields_exist, shape, ShapedFields};
use crate::state::AppState;

/// XML element name of one book
pub const BOOK_ROOT: &str = "BookDto";

fn book_resource(
    renderer: &dyn Renderer,
    links: &LinkBuilder,
    dto: &BookDto,
    fields: Option<&str>,
) -> LinkedResource {
    let resource = LinkedResource::new(shape(dto, fields));
    if renderer.wants_links() {
        resource.with_links(links.book_links(dto.author_id, dto.id, fields))
    } else {
        resource
    }
}

fn check_book_fields(fields: Option<&str>) -> Result<()> {
    if fields_exist(BookDto::FIELDS, fields) {
        return Ok(());
    }
    tracing::warn!(fields = ?fields, "Unknown book field requested");
    Err(Error::BadRequest(format!(
        "Unknown book field in '{}'",
        fields.unwrap_or_default()
    )))
}

async fn ensure_author<R: LibraryRepository>(repository: &R, author_id: Uuid) -> Result<()> {
    if repository.author_exists(author_id).await? {
        Ok(())
    } else {
        Err(Error::NotFound(format!("Author {}", author_id)))
    }
}

/// 201 answer for a book created by POST, PUT or PATCH
fn created(format: OutputFormat, links: &LinkBuilder, book: &Book) -> Result<Representation> {
    let renderer = format.renderer();
    let dto = BookDto::from(book);
    Ok(renderer
        .item(book_resource(renderer, links, &dto, None), BOOK_ROOT)?
        .with_status(StatusCode::CREATED)
        .with_location(&links.book_uri(book.author_id, book.id)))
}

/// `GET /api/authors/{author_id}/books`
pub async fn get_books_for_author<R: LibraryRepository>(
    State(state): State<AppState<R>>,
    Negotiated(format): Negotiated,
    links: LinkBuilder,
    author_id: std::result::Result<Path<Uuid>, PathRejection>,
    params: std::result::Result<Query<ShapeParameters>, QueryRejection>,
) -> Result<Representation> {
    let Path(author_id) = author_id.map_err(path_error)?;
    let Query(params) = params.map_err(query_error)?;
    check_book_fields(params.fields())?;
    ensure_author(state.repository(), author_id).await?;

    let books = state.repository().get_books_for_author(author_id).await?;
    tracing::debug!(author_id = %author_id, count = books.len(), "Listed books");

    let renderer = format.renderer();
    let resources = books
        .iter()
        .map(|book| book_resource(renderer, &links, &BookDto::from(book), params.fields()))
        .collect();
    let collection_links = if renderer.wants_links() {
        links.books_collection_links(author_id)
    } else {
        Vec::new()
    };
    renderer.collection(resources, collection_links, BOOK_ROOT)
}

/// `GET /api/authors/{author_id}/books/{id}`
pub async fn get_book_for_author<R: LibraryRepository>(
    State(state): State<AppState<R>>,
    Negotiated(format): Negotiated,
    links: LinkBuilder,
    ids: std::result::Result<Path<(Uuid, Uuid)>, PathRejection>,
    params: std::result::Result<Query<ShapeParameters>, QueryRejection>,
) -> Result<Representation> {
    let Path((author_id, id)) = ids.map_err(path_error)?;
    let Query(params) = params.map_err(query_error)?;
    check_book_fields(params.fields())?;
    ensure_author(state.repository(), author_id).await?;

    let book = state
        .repository()
        .get_book_for_author(author_id, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Book {} of author {}", id, author_id)))?;

    let renderer = format.renderer();
    renderer.item(
        book_resource(renderer, &links, &BookDto::from(&book), params.fields()),
        BOOK_ROOT,
    )
}

/// `POST /api/authors/{author_id}/books`
pub async fn create_book_for_author<R: LibraryRepository>(
    State(state): State<AppState<R>>,
    Negotiated(format): Negotiated,
    links: LinkBuilder,
    author_id: std::result::Result<Path<Uuid>, PathRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Representation> {
    let Path(author_id) = author_id.map_err(path_error)?;
    let payload: CreateBookDto = parse_body(&headers, &body)?;
    payload.check("")?;
    ensure_author(state.repository(), author_id).await?;

    let book = payload.into_book(Uuid::new_v4(), author_id);
    state
        .repository()
        .add_book_for_author(author_id, book.clone())
        .await?;
    tracing::info!(author_id = %author_id, book_id = %book.id, "Book created");

    created(format, &links, &book)
}

/// `PUT /api/authors/{author_id}/books/{id}`
pub async fn update_book_for_author<R: LibraryRepository>(
    State(state): State<AppState<R>>,
    Negotiated(format): Negotiated,
    links: LinkBuilder,
    ids: std::result::Result<Path<(Uuid, Uuid)>, PathRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let Path((author_id, id)) = ids.map_err(path_error)?;
    let payload: UpdateBookDto = parse_body(&headers, &body)?;
    payload.check("")?;
    ensure_author(state.repository(), author_id).await?;

    save_book(&state, format, &links, author_id, id, payload).await
}

/// `PATCH /api/authors/{author_id}/books/{id}` with a JSON Patch document
///
/// An absent book is patched starting from an empty document.
pub async fn partially_update_book_for_author<R: LibraryRepository>(
    State(state): State<AppState<R>>,
    Negotiated(format): Negotiated,
    links: LinkBuilder,
    ids: std::result::Result<Path<(Uuid, Uuid)>, PathRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let Path((author_id, id)) = ids.map_err(path_error)?;
    let patch: json_patch::Patch = parse_json_body(&headers, &body)?;
    ensure_author(state.repository(), author_id).await?;

    let existing = state.repository().get_book_for_author(author_id, id).await?;
    let payload = apply_patch(existing.as_ref(), &patch)?;
    payload.check("")?;

    save_book(&state, format, &links, author_id, id, payload).await
}

/// Apply `patch` to the update document of `book`, or to an empty one
fn apply_patch(book: Option<&Book>, patch: &json_patch::Patch) -> Result<UpdateBookDto> {
    let mut document = serde_json::to_value(book.map(UpdateBookDto::from).unwrap_or_default())?;

    json_patch::patch(&mut document, &patch.0).map_err(|e| {
        tracing::warn!("JSON patch could not be applied: {}", e);
        patch_error(e.to_string())
    })?;

    serde_json::from_value(document).map_err(|e| {
        tracing::warn!("Patched book is not a valid update: {}", e);
        patch_error(e.to_string())
    })
}

fn patch_error(message: String) -> Error {
    let mut errors = ValidationError::default();
    errors.add_field_error("patchDoc", "INVALID_PATCH", message);
    Error::Validation(errors)
}

/// Upsert shared by PUT and PATCH
async fn save_book<R: LibraryRepository>(
    state: &AppState<R>,
    format: OutputFormat,
    links: &LinkBuilder,
    author_id: Uuid,
    id: Uuid,
    payload: UpdateBookDto,
) -> Result<Response> {
    let repository = state.repository();
    match repository.get_book_for_author(author_id, id).await? {
        None => {
            let book = payload.into_book(id, author_id);
            repository.add_book_for_author(author_id, book.clone()).await?;
            tracing::info!(author_id = %author_id, book_id = %id, "Book created by upsert");
            Ok(created(format, links, &book)?.into_response())
        }
        Some(mut book) => {
            payload.apply_to(&mut book);
            repository.update_book_for_author(book).await?;
            tracing::info!(author_id = %author_id, book_id = %id, "Book updated");
            Ok(NoContent.into_response())
        }
    }
}

/// `DELETE /api/authors/{author_id}/books/{id}`
pub async fn delete_book_for_author<R: LibraryRepository>(
    State(state): State<AppState<R>>,
    ids: std::result::Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<NoContent> {
    let Path((author_id, id)) = ids.map_err(path_error)?;
    ensure_author(state.repository(), author_id).await?;

    if !state.repository().delete_book(author_id, id).await? {
        return Err(Error::NotFound(format!("Book {} of author {}", id, author_id)));
    }
    tracing::info!(author_id = %author_id, book_id = %id, "Book deleted");
    Ok(NoContent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn book() -> Book {
        Book {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            title: "The Shining".to_string(),
            description: Some("A hotel in winter.".to_string()),
        }
    }

    fn patch(value: serde_json::Value) -> json_patch::Patch {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_patch_existing_book() {
        let book = book();
        let updated = apply_patch(
            Some(&book),
            &patch(json!([{ "op": "replace", "path": "/title", "value": "Carrie" }])),
        )
        .unwrap();
        assert_eq!(updated.title.as_deref(), Some("Carrie"));
        assert_eq!(updated.description, book.description);
    }

    #[test]
    fn test_patch_empty_document() {
        let updated = apply_patch(
            None,
            &patch(json!([
                { "op": "replace", "path": "/title", "value": "It" },
                { "op": "replace", "path": "/description", "value": "A clown." }
            ])),
        )
        .unwrap();
        assert_eq!(updated.title.as_deref(), Some("It"));
        assert_eq!(updated.description.as_deref(), Some("A clown."));
    }

    #[test]
    fn test_failed_patch_is_422() {
        let result = apply_patch(
            Some(&book()),
            &patch(json!([{ "op": "remove", "path": "/isbn" }])),
        );
        match result {
            Err(Error::Validation(errors)) => assert_eq!(errors.errors[0].field, "patchDoc"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_patch_with_wrong_type_is_422() {
        let result = apply_patch(
            Some(&book()),
            &patch(json!([{ "op": "replace", "path": "/title", "value": 42 }])),
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_book_field_check() {
        assert!(check_book_fields(Some("title,authorId")).is_ok());
        assert!(check_book_fields(Some("isbn")).is_err());
    }

    #[test]
    fn test_book_resource_links() {
        let dto = BookDto::from(&book());
        let resource = book_resource(
            OutputFormat::Hypermedia.renderer(),
            &LinkBuilder::new(""),
            &dto,
            Some("title"),
        );
        assert_eq!(resource.links.len(), 4);
        assert!(resource.links[0].href.ends_with("?fields=title"));
        assert_eq!(resource.fields.len(), 1);
    }
}
