//! Client sort names mapped onto typed entity columns
//!
//! A [`PropertyMapping`] translates the names a client may put into `orderBy`
//! (matched case-insensitively) into one or more columns of the backing
//! entity, optionally flipping the direction. The
//! [`PropertyMappingService`] is built once at startup, never mutated, and
//! handed to handlers through the application state.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Debug;

use crate::models::{Author, AuthorColumn, AuthorDto};
use crate::shaping::field_names;

/// A sortable column of entity `T`
pub trait SortColumn<T>: Copy + Debug + Send + Sync + 'static {
    /// Ascending comparison of two entities on this column
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// Target of a single client sort name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMappingValue<C> {
    destination: Vec<C>,
    revert: bool,
}

impl<C> PropertyMappingValue<C> {
    pub fn new(destination: Vec<C>, revert: bool) -> Self {
        Self {
            destination,
            revert,
        }
    }

    /// Backing columns in precedence order
    pub fn destination(&self) -> &[C] {
        &self.destination
    }

    /// Whether ascending on the client name means descending on the columns
    pub fn revert(&self) -> bool {
        self.revert
    }
}

/// Client sort names of one output shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMapping<C> {
    entries: HashMap<String, PropertyMappingValue<C>>,
}

impl<C> Default for PropertyMapping<C> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<C> PropertyMapping<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` (stored lowercase) for the given columns
    ///
    /// ```rust
    /// use library_api::models::AuthorColumn;
    /// use library_api::sorting::PropertyMapping;
    ///
    /// let mapping = PropertyMapping::new()
    ///     .with("name", vec![AuthorColumn::FirstName, AuthorColumn::LastName], false);
    /// assert!(mapping.get("NAME").is_some());
    /// ```
    #[must_use]
    pub fn with(mut self, name: &str, destination: Vec<C>, revert: bool) -> Self {
        self.entries.insert(
            name.to_lowercase(),
            PropertyMappingValue::new(destination, revert),
        );
        self
    }

    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Option<&PropertyMappingValue<C>> {
        self.entries.get(&name.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when every clause of `order_by` names a mapped field
    ///
    /// An absent or blank value always passes.
    pub fn valid_mapping_exists_for(&self, order_by: Option<&str>) -> bool {
        match order_by {
            Some(value) if !value.trim().is_empty() => {
                field_names(value).all(|name| self.get(name).is_some())
            }
            _ => true,
        }
    }
}

/// Output shapes that can be sorted through a property mapping
pub trait MappedShape {
    /// Entity the mapped columns belong to
    type Source;
    /// Column type of [`Self::Source`]
    type Column: SortColumn<Self::Source>;

    fn mapping(service: &PropertyMappingService) -> &PropertyMapping<Self::Column>;
}

/// Every property mapping known to the service, keyed by shape type
#[derive(Debug, Clone)]
pub struct PropertyMappingService {
    author: PropertyMapping<AuthorColumn>,
}

impl Default for PropertyMappingService {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyMappingService {
    pub fn new() -> Self {
        let author = PropertyMapping::new()
            .with("id", vec![AuthorColumn::Id], false)
            .with("genre", vec![AuthorColumn::Genre], false)
            .with("age", vec![AuthorColumn::DateOfBirth], true)
            .with(
                "name",
                vec![AuthorColumn::FirstName, AuthorColumn::LastName],
                false,
            );

        Self { author }
    }

    /// Mapping for output shape `D`
    pub fn get_mapping<D: MappedShape>(&self) -> &PropertyMapping<D::Column> {
        D::mapping(self)
    }
}

impl MappedShape for AuthorDto {
    type Source = Author;
    type Column = AuthorColumn;

    fn mapping(service: &PropertyMappingService) -> &PropertyMapping<AuthorColumn> {
        &service.author
    }
}
