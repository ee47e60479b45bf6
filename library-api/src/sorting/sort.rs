//! Building a multi-key comparator from an `orderBy` value
//!
//! The value is a comma-separated list of clauses `<name>[ desc]`.
//! The first clause written by the client is the primary key. Clauses are
//! walked from last to first and every backing column is pushed in front of
//! the keys collected so far, so after the walk the keys read in the order
//! the client wrote them.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::property_mapping::{PropertyMapping, SortColumn};

/// Sort direction of a single key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// One column with its direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey<C> {
    pub column: C,
    pub order: SortOrder,
}

/// Ordered list of sort keys, primary key first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortExpression<C> {
    keys: Vec<SortKey<C>>,
}

impl<C> Default for SortExpression<C> {
    fn default() -> Self {
        Self { keys: Vec::new() }
    }
}

impl<C: Copy> SortExpression<C> {
    /// An expression that leaves the input order untouched
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> &[SortKey<C>] {
        &self.keys
    }

    pub fn is_unsorted(&self) -> bool {
        self.keys.is_empty()
    }

    /// Make `key` the new primary key, demoting the existing ones
    pub fn push_primary(&mut self, key: SortKey<C>) {
        self.keys.insert(0, key);
    }

    /// Compare two entities key by key
    pub fn compare<T>(&self, a: &T, b: &T) -> Ordering
    where
        C: SortColumn<T>,
    {
        for key in &self.keys {
            let ordering = match key.order {
                SortOrder::Asc => key.column.compare(a, b),
                SortOrder::Desc => key.column.compare(b, a),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Stable in-place sort; rows equal on every key keep their relative order
    pub fn sort<T>(&self, items: &mut [T])
    where
        C: SortColumn<T>,
    {
        if !self.is_unsorted() {
            items.sort_by(|a, b| self.compare(a, b));
        }
    }
}

/// Reasons an `orderBy` value cannot be turned into sort keys
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    #[error("Property mapping must not be empty")]
    EmptyMapping,

    #[error("Key mapping for {0} is missing")]
    UnknownField(String),
}

/// Resolve `order_by` against `mapping`
///
/// ```rust
/// use library_api::models::{AuthorColumn, AuthorDto};
/// use library_api::sorting::{build_sort, PropertyMappingService, SortOrder};
///
/// let service = PropertyMappingService::new();
/// let sort = build_sort(Some("age, name desc"), service.get_mapping::<AuthorDto>()).unwrap();
///
/// let keys: Vec<_> = sort.keys().iter().map(|k| (k.column, k.order)).collect();
/// assert_eq!(
///     keys,
///     vec![
///         (AuthorColumn::DateOfBirth, SortOrder::Desc),
///         (AuthorColumn::FirstName, SortOrder::Desc),
///         (AuthorColumn::LastName, SortOrder::Desc),
///     ]
/// );
/// ```
pub fn build_sort<C: Copy>(
    order_by: Option<&str>,
    mapping: &PropertyMapping<C>,
) -> Result<SortExpression<C>, SortError> {
    if mapping.is_empty() {
        return Err(SortError::EmptyMapping);
    }

    let mut expression = SortExpression::unsorted();
    let clauses = match order_by {
        Some(value) if !value.trim().is_empty() => value,
        _ => return Ok(expression),
    };

    for clause in clauses.split(',').rev() {
        let clause = clause.trim();
        let descending = clause.ends_with(" desc");
        let name = match clause.find(' ') {
            Some(index) => &clause[..index],
            None => clause,
        };

        let value = mapping
            .get(name)
            .ok_or_else(|| SortError::UnknownField(name.to_string()))?;

        let mut order = if descending {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        };
        if value.revert() {
            order = order.reversed();
        }

        for column in value.destination().iter().rev() {
            expression.push_primary(SortKey {
                column: *column,
                order,
            });
        }
    }

    Ok(expression)
}
