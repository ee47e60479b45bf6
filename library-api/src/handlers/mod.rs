//! HTTP handlers for the library resources
//!
//! Every resource handler runs the same pass: validate parameters (400),
//! check that the resource or its parent exists (404), touch the repository,
//! then shape the result and render it in the negotiated format.
//!
//! - [`params`]: query string types and page request resolution
//! - [`negotiation`]: `Accept` handling and the plain/hypermedia renderers
//! - [`links`]: link building for hypermedia responses
//! - [`body`]: request body parsing and `Content-Type` constraints
//! - [`root`], [`authors`], [`books`], [`author_collections`]: the endpoints

pub mod author_collections;
pub mod authors;
pub mod body;
pub mod books;
pub mod links;
pub mod negotiation;
pub mod params;
pub mod root;

pub use author_collections::{create_author_collection, get_author_collection};
pub use authors::{
    authors_options, block_author_creation, create_author, delete_author, get_author, get_authors,
};
pub use body::{parse_body, parse_json_body, MediaTypeConstraint};
pub use books::{
    create_book_for_author, delete_book_for_author, get_book_for_author, get_books_for_author,
    partially_update_book_for_author, update_book_for_author,
};
pub use links::{LinkBuilder, LinkDto};
pub use negotiation::{
    LinkedResource, Negotiated, OutputFormat, Renderer, HATEOAS_MEDIA_TYPE, JSON_MEDIA_TYPE,
    XML_MEDIA_TYPE, X_PAGINATION,
};
pub use params::{AuthorsPageRequest, AuthorsResourceParameters, ShapeParameters};
pub use root::get_root;
