//! Book entity and its transfer objects

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::responses::ValidationError;
use crate::shaping::ShapedFields;

/// A book as stored, always owned by one author
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: Option<String>,
}

/// Outgoing book representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDto {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub author_id: Uuid,
}

impl From<&Book> for BookDto {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            description: book.description.clone(),
            author_id: book.author_id,
        }
    }
}

impl ShapedFields for BookDto {
    const FIELDS: &'static [&'static str] = &["id", "title", "description", "authorId"];

    fn field_value(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id.to_string())),
            "title" => Some(Value::from(self.title.clone())),
            "description" => Some(Value::from(self.description.clone())),
            "authorId" => Some(Value::from(self.author_id.to_string())),
            _ => None,
        }
    }
}

/// Common view over the incoming book payloads
pub trait BookForManipulation: Validate {
    fn title(&self) -> Option<&str>;
    fn description(&self) -> Option<&str>;

    /// Field rules plus the title/description rule
    ///
    /// `prefix` is prepended to reported field names, e.g. `books[0].`.
    fn check(&self, prefix: &str) -> Result<(), ValidationError> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationError::default(),
            Err(e) => {
                let mut errors = ValidationError::from(e);
                for error in &mut errors.errors {
                    error.field.insert_str(0, prefix);
                }
                errors
            }
        };

        if self.description() == self.title() {
            errors.add_field_error(
                format!("{prefix}description"),
                "TITLE_EQUALS_DESCRIPTION",
                "Description should be different from Title.",
            );
        }

        errors.into_result()
    }
}

/// Payload for creating a book, alone or nested in an author
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookDto {
    #[validate(
        required(message = "Fill the title."),
        length(max = 100, message = "Title shouldn't have more than 100 characters.")
    )]
    pub title: Option<String>,

    #[validate(length(max = 500, message = "Description shouldn't have more than 500 characters."))]
    pub description: Option<String>,
}

impl BookForManipulation for CreateBookDto {
    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl CreateBookDto {
    /// Build the entity; callers run [`BookForManipulation::check`] first
    pub fn into_book(self, id: Uuid, author_id: Uuid) -> Book {
        Book {
            id,
            author_id,
            title: self.title.unwrap_or_default(),
            description: self.description,
        }
    }
}

/// Payload for replacing a book; also the document JSON patches apply to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookDto {
    #[validate(
        required(message = "Fill the title."),
        length(max = 100, message = "Title shouldn't have more than 100 characters.")
    )]
    pub title: Option<String>,

    #[validate(
        required(message = "Fill the description."),
        length(max = 500, message = "Description shouldn't have more than 500 characters.")
    )]
    pub description: Option<String>,
}

impl BookForManipulation for UpdateBookDto {
    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl From<&Book> for UpdateBookDto {
    fn from(book: &Book) -> Self {
        Self {
            title: Some(book.title.clone()),
            description: book.description.clone(),
        }
    }
}

impl UpdateBookDto {
    /// Overwrite the mapped fields of `book`
    pub fn apply_to(self, book: &mut Book) {
        book.title = self.title.unwrap_or_default();
        book.description = self.description;
    }

    /// A new book at a client-chosen id
    pub fn into_book(self, id: Uuid, author_id: Uuid) -> Book {
        Book {
            id,
            author_id,
            title: self.title.unwrap_or_default(),
            description: self.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaping::shape;

    fn book() -> Book {
        Book {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            title: "Misery".to_string(),
            description: Some("A writer held captive by his number one fan.".to_string()),
        }
    }

    #[test]
    fn test_book_dto_from_book() {
        let book = book();
        let dto = BookDto::from(&book);
        assert_eq!(dto.id, book.id);
        assert_eq!(dto.author_id, book.author_id);
        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("authorId").is_some());
    }

    #[test]
    fn test_book_shape_round_trip() {
        let dto = BookDto::from(&book());
        let shaped = shape(&dto, None);
        let rebuilt: BookDto = serde_json::from_value(Value::Object(shaped)).unwrap();
        assert_eq!(rebuilt, dto);
    }

    #[test]
    fn test_valid_create_book() {
        let dto = CreateBookDto {
            title: Some("It".to_string()),
            description: None,
        };
        assert!(dto.check("").is_ok());
    }

    #[test]
    fn test_title_equal_to_description_is_rejected() {
        let dto = CreateBookDto {
            title: Some("Same".to_string()),
            description: Some("Same".to_string()),
        };
        let errors = dto.check("").unwrap_err();
        assert_eq!(errors.error_count(), 1);
        assert_eq!(errors.errors[0].field, "description");
        assert_eq!(errors.errors[0].code, "TITLE_EQUALS_DESCRIPTION");
        assert_eq!(
            errors.errors[0].message,
            "Description should be different from Title."
        );
    }

    #[test]
    fn test_missing_title_and_long_description() {
        let dto = CreateBookDto {
            title: None,
            description: Some("x".repeat(501)),
        };
        let errors = dto.check("books[2].").unwrap_err();
        let fields: Vec<_> = errors.errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"books[2].title"));
        assert!(fields.contains(&"books[2].description"));
    }

    #[test]
    fn test_title_too_long() {
        let dto = CreateBookDto {
            title: Some("t".repeat(101)),
            description: None,
        };
        let errors = dto.check("").unwrap_err();
        assert_eq!(errors.errors[0].field, "title");
        assert_eq!(errors.errors[0].code, "LENGTH");
    }

    #[test]
    fn test_update_requires_description() {
        let dto = UpdateBookDto {
            title: Some("It".to_string()),
            description: None,
        };
        let errors = dto.check("").unwrap_err();
        assert_eq!(errors.errors[0].field, "description");
        assert_eq!(errors.errors[0].code, "REQUIRED");
    }

    #[test]
    fn test_update_apply_to() {
        let mut book = book();
        UpdateBookDto {
            title: Some("Carrie".to_string()),
            description: Some("Prom night.".to_string()),
        }
        .apply_to(&mut book);
        assert_eq!(book.title, "Carrie");
        assert_eq!(book.description.as_deref(), Some("Prom night."));
    }
}
