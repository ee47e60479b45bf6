//! Data access for authors and their books
//!
//! [`LibraryRepository`] is the seam handlers are generic over.
//! [`InMemoryLibraryRepository`] is the store the binary runs with; it can be
//! seeded with demo data and told to fail commits for exercising error paths.
//!
//! ```rust
//! use library_api::repository::{AuthorsQuery, InMemoryLibraryRepository, LibraryRepository};
//! use library_api::sorting::SortExpression;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let repository = InMemoryLibraryRepository::seeded();
//! let page = repository
//!     .get_authors(&AuthorsQuery::default(), &SortExpression::unsorted())
//!     .await
//!     .unwrap();
//! assert_eq!(page.total_count(), 6);
//! # });
//! ```

mod error;
mod memory;
mod paged_list;
mod seed;
mod traits;

pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use memory::InMemoryLibraryRepository;
pub use paged_list::{PageInfo, PagedList};
pub use seed::seed_authors;
pub use traits::{AuthorsQuery, LibraryRepository, RepositoryResult};
