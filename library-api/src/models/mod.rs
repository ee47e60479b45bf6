//! Domain entities and the representations exchanged with clients

mod author;
mod book;

pub use author::{
    Author, AuthorColumn, AuthorDto, CreateAuthorDto, CreateAuthorWithDateOfDeathDto,
};
pub use book::{Book, BookDto, BookForManipulation, CreateBookDto, UpdateBookDto};
