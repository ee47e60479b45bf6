//! In-process [`LibraryRepository`] backed by a lock-guarded vector
//!
//! Each mutation checks its preconditions and the commit switch before it
//! touches the data, so a failed call never leaves partial state behind.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;
use uuid::Uuid;

use super::error::{RepositoryError, RepositoryOperation};
use super::paged_list::PagedList;
use super::seed::seed_authors;
use super::traits::{AuthorsQuery, LibraryRepository, RepositoryResult};
use crate::models::{Author, AuthorColumn, Book};
use crate::sorting::SortExpression;

/// Author store living in process memory
#[derive(Debug, Default)]
pub struct InMemoryLibraryRepository {
    authors: RwLock<Vec<Author>>,
    fail_commits: AtomicBool,
}

impl InMemoryLibraryRepository {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the demo authors
    pub fn seeded() -> Self {
        Self::with_authors(seed_authors())
    }

    pub fn with_authors(authors: Vec<Author>) -> Self {
        Self {
            authors: RwLock::new(authors),
            fail_commits: AtomicBool::new(false),
        }
    }

    /// Make every following mutation fail at commit time
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    fn commit(&self, operation: RepositoryOperation) -> RepositoryResult<()> {
        if self.fail_commits.load(Ordering::SeqCst) {
            tracing::warn!(%operation, "Rejecting commit");
            return Err(RepositoryError::commit_failed(operation));
        }
        Ok(())
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn book_id_taken(authors: &[Author], book_id: Uuid) -> bool {
    authors
        .iter()
        .flat_map(|a| a.books.iter())
        .any(|b| b.id == book_id)
}

fn check_new_author(
    existing: &[Author],
    author: &Author,
    operation: RepositoryOperation,
) -> RepositoryResult<()> {
    if existing.iter().any(|a| a.id == author.id) {
        return Err(RepositoryError::already_exists(
            operation,
            "Author",
            author.id.to_string(),
        ));
    }
    if let Some(book) = author.books.iter().find(|b| book_id_taken(existing, b.id)) {
        return Err(RepositoryError::already_exists(
            operation,
            "Book",
            book.id.to_string(),
        ));
    }
    Ok(())
}

impl LibraryRepository for InMemoryLibraryRepository {
    async fn get_authors(
        &self,
        query: &AuthorsQuery,
        sort: &SortExpression<AuthorColumn>,
    ) -> RepositoryResult<PagedList<Author>> {
        let genre = query
            .genre
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_lowercase);
        let search = query
            .search_query
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut matching: Vec<Author> = self
            .authors
            .read()
            .await
            .iter()
            .filter(|a| genre.as_ref().is_none_or(|g| a.genre.to_lowercase() == *g))
            .filter(|a| {
                search.as_ref().is_none_or(|s| {
                    contains_ignore_case(&a.genre, s)
                        || contains_ignore_case(&a.first_name, s)
                        || contains_ignore_case(&a.last_name, s)
                })
            })
            .cloned()
            .collect();

        sort.sort(&mut matching);
        Ok(PagedList::create(matching, query.page_number, query.page_size))
    }

    async fn get_authors_by_ids(&self, ids: &[Uuid]) -> RepositoryResult<Vec<Author>> {
        let authors = self.authors.read().await;
        let mut seen = HashSet::with_capacity(ids.len());
        Ok(ids
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| authors.iter().find(|a| a.id == *id).cloned())
            .collect())
    }

    async fn get_author(&self, id: Uuid) -> RepositoryResult<Option<Author>> {
        let authors = self.authors.read().await;
        Ok(authors.iter().find(|a| a.id == id).cloned())
    }

    async fn author_exists(&self, id: Uuid) -> RepositoryResult<bool> {
        let authors = self.authors.read().await;
        Ok(authors.iter().any(|a| a.id == id))
    }

    async fn add_author(&self, author: Author) -> RepositoryResult<()> {
        let mut authors = self.authors.write().await;
        check_new_author(&authors, &author, RepositoryOperation::AddAuthor)?;
        self.commit(RepositoryOperation::AddAuthor)?;
        authors.push(author);
        Ok(())
    }

    async fn add_authors(&self, new_authors: Vec<Author>) -> RepositoryResult<()> {
        let mut authors = self.authors.write().await;
        for (index, author) in new_authors.iter().enumerate() {
            check_new_author(&authors, author, RepositoryOperation::AddAuthor)?;
            // Reject duplicates inside the batch itself as well
            check_new_author(&new_authors[..index], author, RepositoryOperation::AddAuthor)?;
        }
        self.commit(RepositoryOperation::AddAuthor)?;
        authors.extend(new_authors);
        Ok(())
    }

    async fn delete_author(&self, id: Uuid) -> RepositoryResult<bool> {
        let mut authors = self.authors.write().await;
        let Some(position) = authors.iter().position(|a| a.id == id) else {
            return Ok(false);
        };
        self.commit(RepositoryOperation::DeleteAuthor)?;
        authors.remove(position);
        Ok(true)
    }

    async fn get_books_for_author(&self, author_id: Uuid) -> RepositoryResult<Vec<Book>> {
        let authors = self.authors.read().await;
        let mut books: Vec<Book> = authors
            .iter()
            .find(|a| a.id == author_id)
            .map(|a| a.books.clone())
            .unwrap_or_default();
        books.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(books)
    }

    async fn get_book_for_author(
        &self,
        author_id: Uuid,
        book_id: Uuid,
    ) -> RepositoryResult<Option<Book>> {
        let authors = self.authors.read().await;
        Ok(authors
            .iter()
            .find(|a| a.id == author_id)
            .and_then(|a| a.books.iter().find(|b| b.id == book_id))
            .cloned())
    }

    async fn add_book_for_author(&self, author_id: Uuid, mut book: Book) -> RepositoryResult<()> {
        let mut authors = self.authors.write().await;
        if book_id_taken(&authors, book.id) {
            return Err(RepositoryError::already_exists(
                RepositoryOperation::AddBook,
                "Book",
                book.id.to_string(),
            ));
        }
        let Some(author) = authors.iter_mut().find(|a| a.id == author_id) else {
            return Err(RepositoryError::not_found("Author", author_id.to_string())
                .with_operation(RepositoryOperation::AddBook));
        };
        self.commit(RepositoryOperation::AddBook)?;
        book.author_id = author_id;
        author.books.push(book);
        Ok(())
    }

    async fn update_book_for_author(&self, book: Book) -> RepositoryResult<()> {
        let mut authors = self.authors.write().await;
        let Some(existing) = authors
            .iter_mut()
            .find(|a| a.id == book.author_id)
            .and_then(|a| a.books.iter_mut().find(|b| b.id == book.id))
        else {
            return Err(RepositoryError::not_found("Book", book.id.to_string())
                .with_operation(RepositoryOperation::UpdateBook));
        };
        self.commit(RepositoryOperation::UpdateBook)?;
        *existing = book;
        Ok(())
    }

    async fn delete_book(&self, author_id: Uuid, book_id: Uuid) -> RepositoryResult<bool> {
        let mut authors = self.authors.write().await;
        let Some(author) = authors.iter_mut().find(|a| a.id == author_id) else {
            return Ok(false);
        };
        let Some(position) = author.books.iter().position(|b| b.id == book_id) else {
            return Ok(false);
        };
        self.commit(RepositoryOperation::DeleteBook)?;
        author.books.remove(position);
        Ok(true)
    }
}
