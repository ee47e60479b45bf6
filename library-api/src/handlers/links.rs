//! Hypermedia links describing what a client can do next

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::params::AuthorsPageRequest;
use crate::state::AppState;

/// One `{href, rel, method}` triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDto {
    pub href: String,
    pub rel: String,
    pub method: String,
}

impl LinkDto {
    pub fn new(href: impl Into<String>, rel: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rel: rel.into(),
            method: method.into(),
        }
    }
}

/// Builds absolute links for the current request
///
/// The base is `service.public_url` when configured, otherwise
/// `http://{Host}`. Without either, links are relative.
#[derive(Debug, Clone, Default)]
pub struct LinkBuilder {
    base: String,
}

impl<R: Send + Sync> FromRequestParts<AppState<R>> for LinkBuilder {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<R>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(public_url) = &state.config().service.public_url {
            return Ok(Self::new(public_url));
        }

        let base = parts
            .headers
            .get(header::HOST)
            .and_then(|host| host.to_str().ok())
            .map(|host| format!("http://{}", host))
            .unwrap_or_default();
        Ok(Self::new(base))
    }
}

impl LinkBuilder {
    pub fn new(base: impl AsRef<str>) -> Self {
        Self {
            base: base.as_ref().trim_end_matches('/').to_string(),
        }
    }

    /// Absolute form of a path starting with `/`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn with_fields(&self, path: &str, fields: Option<&str>) -> String {
        match fields {
            Some(fields) => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("fields", fields)
                    .finish();
                format!("{}?{}", self.url(path), query)
            }
            None => self.url(path),
        }
    }

    pub fn root_uri(&self) -> String {
        self.url("/api")
    }

    pub fn authors_uri(&self) -> String {
        self.url("/api/authors")
    }

    pub fn author_uri(&self, id: Uuid) -> String {
        self.url(&format!("/api/authors/{}", id))
    }

    pub fn books_uri(&self, author_id: Uuid) -> String {
        self.url(&format!("/api/authors/{}/books", author_id))
    }

    pub fn book_uri(&self, author_id: Uuid, id: Uuid) -> String {
        self.url(&format!("/api/authors/{}/books/{}", author_id, id))
    }

    /// `/api/authorcollections(id1,id2,...)`
    pub fn author_collection_uri(&self, ids: &[Uuid]) -> String {
        let ids: Vec<String> = ids.iter().map(Uuid::to_string).collect();
        self.url(&format!("/api/authorcollections({})", ids.join(",")))
    }

    /// Collection URI echoing every parameter of `request`
    pub fn authors_page_uri(&self, request: &AuthorsPageRequest) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("pageNumber", &request.page_number.to_string())
            .append_pair("pageSize", &request.page_size.to_string());
        if let Some(genre) = &request.genre {
            query.append_pair("genre", genre);
        }
        if let Some(search_query) = &request.search_query {
            query.append_pair("searchQuery", search_query);
        }
        query.append_pair("orderBy", &request.order_by);
        if let Some(fields) = &request.fields {
            query.append_pair("fields", fields);
        }
        format!("{}?{}", self.authors_uri(), query.finish())
    }

    pub fn root_links(&self) -> Vec<LinkDto> {
        vec![
            LinkDto::new(self.root_uri(), "self", "GET"),
            LinkDto::new(self.authors_uri(), "authors", "GET"),
            LinkDto::new(self.authors_uri(), "create_author", "POST"),
        ]
    }

    pub fn author_links(&self, id: Uuid, fields: Option<&str>) -> Vec<LinkDto> {
        let path = format!("/api/authors/{}", id);
        vec![
            LinkDto::new(self.with_fields(&path, fields), "self", "GET"),
            LinkDto::new(self.author_uri(id), "delete_author", "DELETE"),
            LinkDto::new(self.books_uri(id), "create_book_for_author", "POST"),
            LinkDto::new(self.books_uri(id), "books", "GET"),
        ]
    }

    /// `self` plus `nextPage`/`previousPage` when those pages exist
    pub fn authors_collection_links(
        &self,
        request: &AuthorsPageRequest,
        has_next: bool,
        has_previous: bool,
    ) -> Vec<LinkDto> {
        let mut links = vec![LinkDto::new(self.authors_page_uri(request), "self", "GET")];
        if has_next {
            links.push(LinkDto::new(
                self.authors_page_uri(&request.at_page(request.page_number + 1)),
                "nextPage",
                "GET",
            ));
        }
        if has_previous {
            links.push(LinkDto::new(
                self.authors_page_uri(&request.at_page(request.page_number - 1)),
                "previousPage",
                "GET",
            ));
        }
        links
    }

    pub fn book_links(&self, author_id: Uuid, id: Uuid, fields: Option<&str>) -> Vec<LinkDto> {
        let path = format!("/api/authors/{}/books/{}", author_id, id);
        let uri = self.book_uri(author_id, id);
        vec![
            LinkDto::new(self.with_fields(&path, fields), "self", "GET"),
            LinkDto::new(uri.clone(), "delete_book", "DELETE"),
            LinkDto::new(uri.clone(), "update_book", "PUT"),
            LinkDto::new(uri, "partially_update_book", "PATCH"),
        ]
    }

    pub fn books_collection_links(&self, author_id: Uuid) -> Vec<LinkDto> {
        vec![LinkDto::new(self.books_uri(author_id), "self", "GET")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PagingConfig;
    use crate::handlers::params::AuthorsResourceParameters;

    fn request() -> AuthorsPageRequest {
        AuthorsResourceParameters {
            page_number: Some(2),
            page_size: Some(5),
            genre: Some("Science fiction".to_string()),
            fields: Some("id,name".to_string()),
            ..Default::default()
        }
        .resolve(&PagingConfig::default())
    }

    #[test]
    fn test_base_is_trimmed() {
        let links = LinkBuilder::new("http://localhost:6058/");
        assert_eq!(links.authors_uri(), "http://localhost:6058/api/authors");
    }

    #[test]
    fn test_author_self_link_keeps_fields() {
        let links = LinkBuilder::new("http://h");
        let id = Uuid::nil();
        let author_links = links.author_links(id, Some("id,name"));
        assert_eq!(
            author_links[0].href,
            format!("http://h/api/authors/{}?fields=id%2Cname", id)
        );
        let rels: Vec<_> = author_links.iter().map(|l| l.rel.as_str()).collect();
        assert_eq!(
            rels,
            vec!["self", "delete_author", "create_book_for_author", "books"]
        );
    }

    #[test]
    fn test_page_links_echo_parameters() {
        let links = LinkBuilder::new("http://h");
        let collection = links.authors_collection_links(&request(), true, true);
        assert_eq!(collection.len(), 3);
        assert_eq!(
            collection[1].href,
            "http://h/api/authors?pageNumber=3&pageSize=5&genre=Science+fiction&orderBy=name&fields=id%2Cname"
        );
        assert_eq!(collection[2].rel, "previousPage");
        assert!(collection[2].href.contains("pageNumber=1&"));
    }

    #[test]
    fn test_page_links_only_when_pages_exist() {
        let links = LinkBuilder::new("");
        let collection = links.authors_collection_links(&request(), false, false);
        assert_eq!(collection.len(), 1);
        assert!(collection[0].href.starts_with("/api/authors?pageNumber=2"));
    }

    #[test]
    fn test_book_links() {
        let links = LinkBuilder::new("http://h");
        let book_links = links.book_links(Uuid::nil(), Uuid::nil(), None);
        let methods: Vec<_> = book_links.iter().map(|l| l.method.as_str()).collect();
        assert_eq!(methods, vec!["GET", "DELETE", "PUT", "PATCH"]);
    }

    #[test]
    fn test_author_collection_uri() {
        let links = LinkBuilder::new("");
        let ids = [Uuid::nil(), Uuid::from_u128(1)];
        assert_eq!(
            links.author_collection_uri(&ids),
            format!("/api/authorcollections({},{})", ids[0], ids[1])
        );
    }
}
