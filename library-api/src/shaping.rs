//! Field validation and resource shaping
//!
//! Output shapes enumerate their public fields explicitly through
//! [`ShapedFields`]; no reflection is involved. [`fields_exist`] checks a
//! client `fields` list strictly, [`shape`] projects an object onto the
//! requested subset and quietly skips unknown names, so callers validate
//! first and shape second.
//!
//! ```rust
//! use library_api::models::AuthorDto;
//! use library_api::shaping::{fields_exist, shape, ShapedFields};
//! use uuid::Uuid;
//!
//! let author = AuthorDto {
//!     id: Uuid::nil(),
//!     name: "Douglas Adams".to_string(),
//!     age: 49,
//!     genre: "Science fiction".to_string(),
//! };
//!
//! assert!(fields_exist(AuthorDto::FIELDS, Some("ID, Name")));
//! let shaped = shape(&author, Some("ID, Name"));
//! assert_eq!(shaped.keys().collect::<Vec<_>>(), vec!["id", "name"]);
//! ```

use serde_json::{Map, Value};

/// A field-name to value projection of one output object
///
/// Keys keep insertion order, so a full projection lists fields in their
/// declared order.
pub type ShapedEntity = Map<String, Value>;

/// Output shapes with an explicit field table
pub trait ShapedFields {
    /// Canonical field names in declaration order
    const FIELDS: &'static [&'static str];

    /// Current value of the canonical field `name`
    fn field_value(&self, name: &str) -> Option<Value>;
}

/// Names in a comma-separated field list
///
/// Every entry is trimmed and cut at its first space, so sort clauses such
/// as `name desc` yield `name`.
pub(crate) fn field_names(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(|entry| {
        let entry = entry.trim();
        match entry.find(' ') {
            Some(index) => &entry[..index],
            None => entry,
        }
    })
}

fn resolve<'a>(shape_fields: &[&'a str], requested: &str) -> Option<&'a str> {
    shape_fields
        .iter()
        .copied()
        .find(|field| field.eq_ignore_ascii_case(requested))
}

/// True when every name in `requested` is one of `shape_fields`
///
/// A missing or blank list places no restriction and passes.
pub fn fields_exist(shape_fields: &[&str], requested: Option<&str>) -> bool {
    match requested {
        Some(list) if !list.trim().is_empty() => {
            field_names(list).all(|name| resolve(shape_fields, name).is_some())
        }
        _ => true,
    }
}

/// Project `entity` onto the requested fields, or onto all of them
pub fn shape<T: ShapedFields>(entity: &T, requested: Option<&str>) -> ShapedEntity {
    let mut shaped = Map::new();

    match requested {
        Some(list) if !list.trim().is_empty() => {
            for name in field_names(list) {
                let Some(field) = resolve(T::FIELDS, name) else {
                    continue;
                };
                if let Some(value) = entity.field_value(field) {
                    shaped.insert(field.to_string(), value);
                }
            }
        }
        _ => {
            for field in T::FIELDS {
                if let Some(value) = entity.field_value(field) {
                    shaped.insert((*field).to_string(), value);
                }
            }
        }
    }

    shaped
}

/// [`shape`] applied to every entity, preserving order
pub fn shape_many<T: ShapedFields>(entities: &[T], requested: Option<&str>) -> Vec<ShapedEntity> {
    entities
        .iter()
        .map(|entity| shape(entity, requested))
        .collect()
}
