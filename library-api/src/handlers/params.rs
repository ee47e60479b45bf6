//! Query string parameters of the resource endpoints

use axum::extract::rejection::{PathRejection, QueryRejection};
use serde::Deserialize;

use crate::config::PagingConfig;
use crate::error::Error;
use crate::repository::AuthorsQuery;

/// Sort applied when the client sends no `orderBy`
pub const DEFAULT_ORDER_BY: &str = "name";

/// Raw parameters of `GET /api/authors`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorsResourceParameters {
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
    pub genre: Option<String>,
    pub search_query: Option<String>,
    pub order_by: Option<String>,
    pub fields: Option<String>,
}

impl AuthorsResourceParameters {
    /// Apply defaults and the page size cap
    pub fn resolve(self, paging: &PagingConfig) -> AuthorsPageRequest {
        AuthorsPageRequest {
            page_number: self.page_number.unwrap_or(1).max(1),
            page_size: paging.effective_page_size(self.page_size),
            genre: non_blank(self.genre),
            search_query: non_blank(self.search_query),
            order_by: non_blank(self.order_by).unwrap_or_else(|| DEFAULT_ORDER_BY.to_string()),
            fields: non_blank(self.fields),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Effective page request, echoed back in page links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorsPageRequest {
    pub page_number: u32,
    pub page_size: u32,
    pub genre: Option<String>,
    pub search_query: Option<String>,
    pub order_by: String,
    pub fields: Option<String>,
}

impl AuthorsPageRequest {
    /// The filter and page selection handed to the repository
    pub fn query(&self) -> AuthorsQuery {
        AuthorsQuery {
            page_number: self.page_number,
            page_size: self.page_size,
            genre: self.genre.clone(),
            search_query: self.search_query.clone(),
        }
    }

    /// Same request at another page
    pub fn at_page(&self, page_number: u32) -> Self {
        Self {
            page_number,
            ..self.clone()
        }
    }
}

/// `fields` parameter of single resources and the books collection
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShapeParameters {
    pub fields: Option<String>,
}

impl ShapeParameters {
    pub fn fields(&self) -> Option<&str> {
        self.fields.as_deref().filter(|f| !f.trim().is_empty())
    }
}

pub(crate) fn query_error(rejection: QueryRejection) -> Error {
    tracing::warn!("Rejected query string: {}", rejection.body_text());
    Error::BadRequest(rejection.body_text())
}

pub(crate) fn path_error(rejection: PathRejection) -> Error {
    tracing::warn!("Rejected path parameters: {}", rejection.body_text());
    Error::BadRequest(rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = AuthorsResourceParameters::default().resolve(&PagingConfig::default());
        assert_eq!(request.page_number, 1);
        assert_eq!(request.page_size, 10);
        assert_eq!(request.order_by, "name");
        assert!(request.fields.is_none());
    }

    #[test]
    fn test_page_size_is_capped() {
        let params = AuthorsResourceParameters {
            page_size: Some(100),
            page_number: Some(0),
            ..Default::default()
        };
        let request = params.resolve(&PagingConfig::default());
        assert_eq!(request.page_size, 20);
        assert_eq!(request.page_number, 1);
    }

    #[test]
    fn test_blank_values_are_dropped() {
        let params = AuthorsResourceParameters {
            genre: Some("  ".to_string()),
            order_by: Some(String::new()),
            ..Default::default()
        };
        let request = params.resolve(&PagingConfig::default());
        assert!(request.genre.is_none());
        assert_eq!(request.order_by, DEFAULT_ORDER_BY);
    }

    #[test]
    fn test_camel_case_query_names() {
        let params: AuthorsResourceParameters = serde_json::from_value(serde_json::json!({
            "pageNumber": 2,
            "pageSize": 5,
            "searchQuery": "king",
            "orderBy": "age desc"
        }))
        .unwrap();
        assert_eq!(params.page_number, Some(2));
        assert_eq!(params.search_query.as_deref(), Some("king"));
        assert_eq!(params.order_by.as_deref(), Some("age desc"));
    }

    #[test]
    fn test_at_page_keeps_everything_else() {
        let request = AuthorsResourceParameters {
            genre: Some("Fantasy".to_string()),
            ..Default::default()
        }
        .resolve(&PagingConfig::default());
        let next = request.at_page(2);
        assert_eq!(next.page_number, 2);
        assert_eq!(next.genre.as_deref(), Some("Fantasy"));
        assert_eq!(next.order_by, request.order_by);
    }
}
