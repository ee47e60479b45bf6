//! Author entity, its sortable columns and transfer objects

use std::cmp::Ordering;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::book::{Book, BookForManipulation, CreateBookDto};
use crate::responses::ValidationError;
use crate::shaping::ShapedFields;
use crate::sorting::SortColumn;

/// An author as stored, together with the books they wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub date_of_death: Option<NaiveDate>,
    pub genre: String,
    pub books: Vec<Book>,
}

impl Author {
    /// Whole years lived up to `today`, or up to the date of death
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        let end = self.date_of_death.unwrap_or(today);
        end.years_since(self.date_of_birth).unwrap_or(0)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Sortable columns of [`Author`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorColumn {
    Id,
    FirstName,
    LastName,
    Genre,
    DateOfBirth,
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

impl SortColumn<Author> for AuthorColumn {
    fn compare(&self, a: &Author, b: &Author) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::FirstName => compare_text(&a.first_name, &b.first_name),
            Self::LastName => compare_text(&a.last_name, &b.last_name),
            Self::Genre => compare_text(&a.genre, &b.genre),
            Self::DateOfBirth => a.date_of_birth.cmp(&b.date_of_birth),
        }
    }
}

/// Outgoing author representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDto {
    pub id: Uuid,
    pub name: String,
    pub age: u32,
    pub genre: String,
}

impl AuthorDto {
    /// Map an author with the age computed against `today`
    pub fn from_author(author: &Author, today: NaiveDate) -> Self {
        Self {
            id: author.id,
            name: author.full_name(),
            age: author.age_on(today),
            genre: author.genre.clone(),
        }
    }
}

impl From<&Author> for AuthorDto {
    fn from(author: &Author) -> Self {
        Self::from_author(author, Utc::now().date_naive())
    }
}

impl ShapedFields for AuthorDto {
    const FIELDS: &'static [&'static str] = &["id", "name", "age", "genre"];

    fn field_value(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id.to_string())),
            "name" => Some(Value::from(self.name.clone())),
            "age" => Some(Value::from(self.age)),
            "genre" => Some(Value::from(self.genre.clone())),
            _ => None,
        }
    }
}

/// Payload for creating an author, optionally with books
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthorDto {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub genre: String,
    #[serde(default)]
    pub books: Vec<CreateBookDto>,
}

/// Payload for creating an author that has passed away
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthorWithDateOfDeathDto {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub date_of_death: Option<NaiveDate>,
    pub genre: String,
    #[serde(default)]
    pub books: Vec<CreateBookDto>,
}

impl From<CreateAuthorDto> for CreateAuthorWithDateOfDeathDto {
    fn from(dto: CreateAuthorDto) -> Self {
        Self {
            first_name: dto.first_name,
            last_name: dto.last_name,
            date_of_birth: dto.date_of_birth,
            date_of_death: None,
            genre: dto.genre,
            books: dto.books,
        }
    }
}

impl CreateAuthorWithDateOfDeathDto {
    /// Check every nested book, reporting fields as `books[i].<field>`
    pub fn check(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::default();
        if let Some(death) = self.date_of_death {
            if death < self.date_of_birth {
                errors.add_field_error(
                    "dateOfDeath",
                    "DEATH_BEFORE_BIRTH",
                    "Date of death can't be before the date of birth.",
                );
            }
        }
        for (index, book) in self.books.iter().enumerate() {
            if let Err(book_errors) = book.check(&format!("books[{index}].")) {
                errors.errors.extend(book_errors.errors);
            }
        }
        errors.into_result()
    }

    /// Build the entity with fresh ids for the author and each book
    pub fn into_author(self) -> Author {
        let id = Uuid::new_v4();
        let books = self
            .books
            .into_iter()
            .map(|book| book.into_book(Uuid::new_v4(), id))
            .collect();

        Author {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth: self.date_of_birth,
            date_of_death: self.date_of_death,
            genre: self.genre,
            books,
        }
    }
}
