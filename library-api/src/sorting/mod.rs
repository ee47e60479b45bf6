//! Sorting through property mappings
//!
//! - [`PropertyMappingService`]: immutable table from client sort names to
//!   typed entity columns, one [`PropertyMapping`] per output shape
//! - [`build_sort`]: turns an `orderBy` string into a [`SortExpression`],
//!   a composed multi-key comparator applied in memory

mod property_mapping;
mod sort;

pub use property_mapping::{
    MappedShape, PropertyMapping, PropertyMappingService, PropertyMappingValue, SortColumn,
};
pub use sort::{build_sort, SortError, SortExpression, SortKey, SortOrder};
