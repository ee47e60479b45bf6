//! Author endpoints

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
};
use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use super::body::{parse_body, MediaTypeConstraint};
use super::links::LinkBuilder;
use super::negotiation::{pagination_header, LinkedResource, Negotiated, Renderer, X_PAGINATION};
use super::params::{path_error, query_error, AuthorsResourceParameters, ShapeParameters};
use crate::error::{Error, Result};
use crate::models::{AuthorDto, CreateAuthorDto, CreateAuthorWithDateOfDeathDto};
use crate::repository::LibraryRepository;
use crate::responses::{NoContent, Representation};
use crate::shaping::{fields_exist, shape, ShapedFields};
use crate::sorting::build_sort;
use crate::state::AppState;

/// XML element name of one author
pub const AUTHOR_ROOT: &str = "AuthorDto";

/// Payloads read as [`CreateAuthorDto`]
pub const AUTHOR_INPUT: MediaTypeConstraint = MediaTypeConstraint::new(
    "content-type",
    &["application/json", "application/vnd.marvin.author.full+json"],
);

/// Payloads read as [`CreateAuthorWithDateOfDeathDto`]
pub const AUTHOR_WITH_DATE_OF_DEATH_INPUT: MediaTypeConstraint = MediaTypeConstraint::new(
    "content-type",
    &[
        "application/vnd.marvin.authorwithdateofdeath.full+json",
        "application/vnd.marvin.authorwithdateofdeath.full+xml",
    ],
);

/// Allowed methods on the authors collection
pub const AUTHORS_ALLOW: &str = "GET,OPTIONS,POST";

/// Shaped author plus its links when the renderer wants them
pub(crate) fn author_resource(
    renderer: &dyn Renderer,
    links: &LinkBuilder,
    dto: &AuthorDto,
    fields: Option<&str>,
) -> LinkedResource {
    let resource = LinkedResource::new(shape(dto, fields));
    if renderer.wants_links() {
        resource.with_links(links.author_links(dto.id, fields))
    } else {
        resource
    }
}

pub(crate) fn check_author_fields(fields: Option<&str>) -> Result<()> {
    if fields_exist(AuthorDto::FIELDS, fields) {
        return Ok(());
    }
    tracing::warn!(fields = ?fields, "Unknown author field requested");
    Err(Error::BadRequest(format!(
        "Unknown author field in '{}'",
        fields.unwrap_or_default()
    )))
}

/// `GET /api/authors`
pub async fn get_authors<R: LibraryRepository>(
    State(state): State<AppState<R>>,
    Negotiated(format): Negotiated,
    links: LinkBuilder,
    params: std::result::Result<Query<AuthorsResourceParameters>, QueryRejection>,
) -> Result<Representation> {
    let Query(params) = params.map_err(query_error)?;
    let request = params.resolve(&state.config().paging);

    let mapping = state.property_mapping().get_mapping::<AuthorDto>();
    if !mapping.valid_mapping_exists_for(Some(&request.order_by)) {
        tracing::warn!(order_by = %request.order_by, "Unknown author sort field");
        return Err(Error::BadRequest(format!(
            "Unknown author sort field in '{}'",
            request.order_by
        )));
    }
    check_author_fields(request.fields.as_deref())?;

    let sort = build_sort(Some(&request.order_by), mapping)
        .map_err(|e| Error::BadRequest(e.to_string()))?;
    let page = state
        .repository()
        .get_authors(&request.query(), &sort)
        .await?;
    tracing::debug!(
        page = request.page_number,
        returned = page.len(),
        total = page.total_count(),
        "Listed authors"
    );

    let renderer = format.renderer();
    let previous = page
        .has_previous()
        .then(|| links.authors_page_uri(&request.at_page(request.page_number - 1)));
    let next = page
        .has_next()
        .then(|| links.authors_page_uri(&request.at_page(request.page_number + 1)));
    let metadata = renderer.pagination(page.info(), previous, next);

    let today = Utc::now().date_naive();
    let fields = request.fields.as_deref();
    let resources = page
        .items()
        .iter()
        .map(|author| {
            author_resource(
                renderer,
                &links,
                &AuthorDto::from_author(author, today),
                fields,
            )
        })
        .collect();
    let collection_links = if renderer.wants_links() {
        links.authors_collection_links(&request, page.has_next(), page.has_previous())
    } else {
        Vec::new()
    };

    Ok(renderer
        .collection(resources, collection_links, AUTHOR_ROOT)?
        .with_header(X_PAGINATION, pagination_header(&metadata)?))
}

/// `GET /api/authors/{id}`
pub async fn get_author<R: LibraryRepository>(
    State(state): State<AppState<R>>,
    Negotiated(format): Negotiated,
    links: LinkBuilder,
    id: std::result::Result<Path<Uuid>, PathRejection>,
    params: std::result::Result<Query<ShapeParameters>, QueryRejection>,
) -> Result<Representation> {
    let Path(id) = id.map_err(path_error)?;
    let Query(params) = params.map_err(query_error)?;
    check_author_fields(params.fields())?;

    let author = state
        .repository()
        .get_author(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Author {}", id)))?;
    tracing::debug!(author_id = %id, "Fetched author");

    let renderer = format.renderer();
    let dto = AuthorDto::from(&author);
    renderer.item(
        author_resource(renderer, &links, &dto, params.fields()),
        AUTHOR_ROOT,
    )
}

/// `POST /api/authors`
///
/// The `Content-Type` picks the payload schema; authors may arrive with
/// their books.
pub async fn create_author<R: LibraryRepository>(
    State(state): State<AppState<R>>,
    Negotiated(format): Negotiated,
    links: LinkBuilder,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Representation> {
    let payload: CreateAuthorWithDateOfDeathDto = if AUTHOR_INPUT.matches(&headers) {
        parse_body::<CreateAuthorDto>(&headers, &body)?.into()
    } else if AUTHOR_WITH_DATE_OF_DEATH_INPUT.matches(&headers) {
        parse_body(&headers, &body)?
    } else {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        tracing::warn!(content_type = %content_type, "No author schema for content type");
        return Err(Error::UnsupportedMediaType(content_type.to_string()));
    };
    payload.check()?;

    let author = payload.into_author();
    let dto = AuthorDto::from(&author);
    let book_count = author.books.len();
    state.repository().add_author(author).await?;
    tracing::info!(author_id = %dto.id, books = book_count, "Author created");

    let renderer = format.renderer();
    Ok(renderer
        .item(author_resource(renderer, &links, &dto, None), AUTHOR_ROOT)?
        .with_status(StatusCode::CREATED)
        .with_location(&links.author_uri(dto.id)))
}

/// `POST /api/authors/{id}`
///
/// Creating at an existing id conflicts; any other id does not exist.
pub async fn block_author_creation<R: LibraryRepository>(
    State(state): State<AppState<R>>,
    id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<NoContent> {
    let Path(id) = id.map_err(path_error)?;
    if state.repository().author_exists(id).await? {
        tracing::warn!(author_id = %id, "Author creation at an existing id");
        return Err(Error::Conflict(format!("Author {} already exists", id)));
    }
    Err(Error::NotFound(format!("Author {}", id)))
}

/// `DELETE /api/authors/{id}`, books included
pub async fn delete_author<R: LibraryRepository>(
    State(state): State<AppState<R>>,
    id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<NoContent> {
    let Path(id) = id.map_err(path_error)?;
    if !state.repository().delete_author(id).await? {
        return Err(Error::NotFound(format!("Author {}", id)));
    }
    tracing::info!(author_id = %id, "Author deleted");
    Ok(NoContent)
}

/// `OPTIONS /api/authors`
pub async fn authors_options() -> impl IntoResponse {
    (StatusCode::OK, [(header::ALLOW, AUTHORS_ALLOW)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::negotiation::OutputFormat;
    use axum::http::HeaderValue;

    fn dto() -> AuthorDto {
        AuthorDto {
            id: Uuid::nil(),
            name: "Stephen King".to_string(),
            age: 70,
            genre: "Horror".to_string(),
        }
    }

    #[test]
    fn test_plain_resource_has_no_links() {
        let resource = author_resource(
            OutputFormat::Json.renderer(),
            &LinkBuilder::new("http://h"),
            &dto(),
            Some("name"),
        );
        assert!(resource.links.is_empty());
        assert_eq!(resource.fields.len(), 1);
    }

    #[test]
    fn test_hypermedia_resource_links() {
        let resource = author_resource(
            OutputFormat::Hypermedia.renderer(),
            &LinkBuilder::new("http://h"),
            &dto(),
            None,
        );
        assert_eq!(resource.links.len(), 4);
        assert_eq!(resource.fields.len(), 4);
    }

    #[test]
    fn test_author_field_check() {
        assert!(check_author_fields(Some("id, Name")).is_ok());
        assert!(check_author_fields(None).is_ok());
        assert!(matches!(
            check_author_fields(Some("id,shoeSize")),
            Err(Error::BadRequest(_))
        ));
    }

    #[test]
    fn test_input_constraints() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/vnd.marvin.authorwithdateofdeath.full+xml"),
        );
        assert!(!AUTHOR_INPUT.matches(&headers));
        assert!(AUTHOR_WITH_DATE_OF_DEATH_INPUT.matches(&headers));
    }

    #[tokio::test]
    async fn test_options_allow_header() {
        let response = authors_options().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ALLOW], AUTHORS_ALLOW);
    }
}
