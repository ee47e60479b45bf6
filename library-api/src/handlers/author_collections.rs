//! Batch author endpoints
//!
//! A batch is addressed as `/api/authorcollections(id1,id2,...)`.

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::{HeaderMap, StatusCode},
};
use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use super::authors::{author_resource, AUTHOR_ROOT};
use super::body::parse_json_body;
use super::links::LinkBuilder;
use super::negotiation::Negotiated;
use super::params::path_error;
use crate::error::{Error, Result};
use crate::models::{AuthorDto, CreateAuthorDto, CreateAuthorWithDateOfDeathDto};
use crate::repository::LibraryRepository;
use crate::responses::{Representation, ValidationError};
use crate::state::AppState;

const COLLECTION_PREFIX: &str = "authorcollections(";

/// Id list of an `authorcollections(...)` path segment
///
/// `None` when the segment does not name an author collection at all.
pub fn parse_collection_segment(segment: &str) -> Option<Result<Vec<Uuid>>> {
    let inner = segment.strip_prefix(COLLECTION_PREFIX)?.strip_suffix(')')?;
    Some(parse_ids(inner))
}

fn parse_ids(list: &str) -> Result<Vec<Uuid>> {
    if list.trim().is_empty() {
        return Err(Error::BadRequest("The id list is empty".to_string()));
    }
    list.split(',')
        .map(|id| {
            Uuid::parse_str(id.trim())
                .map_err(|e| Error::BadRequest(format!("Invalid author id '{}': {}", id.trim(), e)))
        })
        .collect()
}

/// `GET /api/authorcollections({ids})`
/// Every id must resolve to a distinct author, otherwise 404.
/// Every id must resolve, otherwise 404.
pub async fn get_author_collection<R: LibraryRepository>(
    State(state): State<AppState<R>>,
    Negotiated(format): Negotiated,
    links: LinkBuilder,
    segment: std::result::Result<Path<String>, PathRejection>,
) -> Result<Representation> {
    let Path(segment) = segment.map_err(path_error)?;
    let ids = parse_collection_segment(&segment)
        .ok_or_else(|| Error::NotFound(format!("/api/{}", segment)))?
        .inspect_err(|e| tracing::warn!("Rejected author collection: {}", e))?;

    let authors = state.repository().get_authors_by_ids(&ids).await?;
    if authors.len() != ids.len() {
        tracing::debug!(
            requested = ids.len(),
            found = authors.len(),
            "Author collection has unknown ids"
        );
        return Err(Error::NotFound(format!("/api/{}", segment)));
    }

    let renderer = format.renderer();
    let today = Utc::now().date_naive();
    let resources = authors
        .iter()
        .map(|author| {
            author_resource(
                renderer,
                &links,
                &AuthorDto::from_author(author, today),
                None,
            )
        })
        .collect();
    renderer.collection(resources, Vec::new(), AUTHOR_ROOT)
}

/// Run every author's checks, reporting fields as `[i].<field>`
fn check_batch(authors: &[CreateAuthorWithDateOfDeathDto]) -> Result<()> {
    let mut errors = ValidationError::default();
    for (index, author) in authors.iter().enumerate() {
        if let Err(author_errors) = author.check() {
            for mut error in author_errors.errors {
                error.field.insert_str(0, &format!("[{index}]."));
                errors.errors.push(error);
            }
        }
    }
    errors.into_result().map_err(Error::from)
}

/// `POST /api/authorcollections`
pub async fn create_author_collection<R: LibraryRepository>(
    State(state): State<AppState<R>>,
    Negotiated(format): Negotiated,
    links: LinkBuilder,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Representation> {
    let payload: Vec<CreateAuthorDto> = parse_json_body(&headers, &body)?;
    if payload.is_empty() {
        tracing::warn!("Empty author collection posted");
        return Err(Error::BadRequest(
            "An author collection needs at least one author".to_string(),
        ));
    }

    let payload: Vec<CreateAuthorWithDateOfDeathDto> =
        payload.into_iter().map(Into::into).collect();
    check_batch(&payload)?;

    let authors: Vec<_> = payload
        .into_iter()
        .map(CreateAuthorWithDateOfDeathDto::into_author)
        .collect();
    let ids: Vec<Uuid> = authors.iter().map(|author| author.id).collect();
    let today = Utc::now().date_naive();
    let dtos: Vec<AuthorDto> = authors
        .iter()
        .map(|author| AuthorDto::from_author(author, today))
        .collect();

    state.repository().add_authors(authors).await?;
    tracing::info!(count = ids.len(), "Author collection created");

    let renderer = format.renderer();
    let resources = dtos
        .iter()
        .map(|dto| author_resource(renderer, &links, dto, None))
        .collect();
    Ok(renderer
        .collection(resources, Vec::new(), AUTHOR_ROOT)?
        .with_status(StatusCode::CREATED)
        .with_location(&links.author_collection_uri(&ids)))
}
