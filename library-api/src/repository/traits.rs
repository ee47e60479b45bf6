//! The data-access seam
//!
//! [`LibraryRepository`] uses RPITIT (Return Position Impl Trait In Traits)
//! for async methods without `async_trait`. Every mutating method is its own
//! unit of work: it either commits completely or leaves the store untouched
//! and reports a [`RepositoryError`].

use std::future::Future;

use uuid::Uuid;

use super::error::RepositoryError;
use super::paged_list::PagedList;
use crate::models::{Author, AuthorColumn, Book};
use crate::sorting::SortExpression;

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Filter and page selection for the author collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorsQuery {
    /// 1-based page number
    pub page_number: u32,
    /// Rows per page, already capped
    pub page_size: u32,
    /// Exact genre match, case-insensitive
    pub genre: Option<String>,
    /// Case-insensitive substring over genre, first name and last name
    pub search_query: Option<String>,
}

impl Default for AuthorsQuery {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: 10,
            genre: None,
            search_query: None,
        }
    }
}

/// Storage of authors and their books
pub trait LibraryRepository: Send + Sync + 'static {
    /// Filter, sort and page the author collection
    fn get_authors(
        &self,
        query: &AuthorsQuery,
        sort: &SortExpression<AuthorColumn>,
    ) -> impl Future<Output = RepositoryResult<PagedList<Author>>> + Send;

    /// Distinct authors for the given ids, in request order; unknown and
    /// repeated ids are skipped
    fn get_authors_by_ids(
        &self,
        ids: &[Uuid],
    ) -> impl Future<Output = RepositoryResult<Vec<Author>>> + Send;

    fn get_author(&self, id: Uuid) -> impl Future<Output = RepositoryResult<Option<Author>>> + Send;

    fn author_exists(&self, id: Uuid) -> impl Future<Output = RepositoryResult<bool>> + Send;

    /// Add an author together with its books
    fn add_author(&self, author: Author) -> impl Future<Output = RepositoryResult<()>> + Send;

    /// Add several authors in one unit of work
    fn add_authors(&self, authors: Vec<Author>) -> impl Future<Output = RepositoryResult<()>> + Send;

    /// Remove an author and all of its books; `false` when absent
    fn delete_author(&self, id: Uuid) -> impl Future<Output = RepositoryResult<bool>> + Send;

    /// Books of an author ordered by title
    fn get_books_for_author(
        &self,
        author_id: Uuid,
    ) -> impl Future<Output = RepositoryResult<Vec<Book>>> + Send;

    fn get_book_for_author(
        &self,
        author_id: Uuid,
        book_id: Uuid,
    ) -> impl Future<Output = RepositoryResult<Option<Book>>> + Send;

    /// Add a book; the id may be chosen by the client (upsert)
    fn add_book_for_author(
        &self,
        author_id: Uuid,
        book: Book,
    ) -> impl Future<Output = RepositoryResult<()>> + Send;

    /// Overwrite an existing book
    fn update_book_for_author(&self, book: Book) -> impl Future<Output = RepositoryResult<()>> + Send;

    /// Remove a book; `false` when absent
    fn delete_book(
        &self,
        author_id: Uuid,
        book_id: Uuid,
    ) -> impl Future<Output = RepositoryResult<bool>> + Send;
}
