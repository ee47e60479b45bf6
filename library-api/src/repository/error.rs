//! Repository error types
//!
//! Every failure coming out of the data-access seam is a [`RepositoryError`]
//! carrying the operation that was running, a coarse [`RepositoryErrorKind`]
//! and, where known, the entity involved.
//!
//! # Example
//!
//! ```rust
//! use library_api::repository::{RepositoryError, RepositoryErrorKind};
//!
//! let error = RepositoryError::not_found("Author", "76053df4-6687-4353-8937-b45556748abe");
//! assert!(matches!(error.kind, RepositoryErrorKind::NotFound));
//! assert!(error.entity_id.is_some());
//! ```

use std::fmt;

/// Operation being performed when the repository error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    /// Loading a single author
    GetAuthor,
    /// Adding one or more authors
    AddAuthor,
    /// Removing an author and its books
    DeleteAuthor,
    /// Adding a book to an author
    AddBook,
    /// Overwriting an existing book
    UpdateBook,
    /// Removing a book
    DeleteBook,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GetAuthor => write!(f, "get_author"),
            Self::AddAuthor => write!(f, "add_author"),
            Self::DeleteAuthor => write!(f, "delete_author"),
            Self::AddBook => write!(f, "add_book"),
            Self::UpdateBook => write!(f, "update_book"),
            Self::DeleteBook => write!(f, "delete_book"),
        }
    }
}

/// Category of repository error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// Entity was not found
    NotFound,
    /// Entity with the same identifier already exists
    AlreadyExists,
    /// The store refused to commit the unit of work
    CommitFailed,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::AlreadyExists => write!(f, "already_exists"),
            Self::CommitFailed => write!(f, "commit_failed"),
        }
    }
}

/// Structured repository error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    /// The operation being performed when the error occurred
    pub operation: RepositoryOperation,
    /// The category of error
    pub kind: RepositoryErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The type of entity involved (e.g., "Author", "Book")
    pub entity_type: Option<String>,
    /// The ID of the entity involved
    pub entity_id: Option<String>,
}

impl RepositoryError {
    /// Create a new repository error
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    /// Create a "not found" error with entity context
    pub fn not_found(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::GetAuthor,
            RepositoryErrorKind::NotFound,
            "Entity not found",
        )
        .with_entity(entity_type, entity_id)
    }

    /// Create an "already exists" error with entity context
    pub fn already_exists(
        operation: RepositoryOperation,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        Self::new(
            operation,
            RepositoryErrorKind::AlreadyExists,
            "Entity already exists",
        )
        .with_entity(entity_type, entity_id)
    }

    /// Create a commit failure for the given operation
    ///
    /// ```rust
    /// use library_api::repository::{RepositoryError, RepositoryOperation};
    ///
    /// let error = RepositoryError::commit_failed(RepositoryOperation::AddAuthor);
    /// assert_eq!(
    ///     error.to_string(),
    ///     "Repository commit_failed error during add_author: Saving changes failed"
    /// );
    /// ```
    pub fn commit_failed(operation: RepositoryOperation) -> Self {
        Self::new(
            operation,
            RepositoryErrorKind::CommitFailed,
            "Saving changes failed",
        )
    }

    /// Add entity context to an existing error
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: RepositoryOperation) -> Self {
        self.operation = operation;
        self
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(ref entity_type), Some(ref entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for RepositoryError {}
