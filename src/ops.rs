//! Shape transformation operators.
//!
//! Every operator is pure: inputs are borrowed, a new shape comes back, and
//! a failing call returns one error without partial results. Operators that
//! need a record look through references at the top level to find it.
pub mod deep;
pub mod filter;
pub mod intersect;
pub mod keys;

pub use deep::{deep_partial, deep_readonly, flatten};
pub use filter::{exclude_by_type, exclude_type, pick_by_type};
pub use intersect::union_to_intersection;
pub use keys::{assert_keys, merge, nullable_all_keys, nullable_keys, strict_omit};

use crate::error::{Result, ShapeError};
use crate::shape::{Record, Shape};

/// Tag `shape` so it only matches shapes carrying the same tag.
pub fn nominal(shape: &Shape, tag: &str) -> Shape {
    Shape::nominal(shape.clone(), tag)
}

pub(crate) fn expect_record<'a>(shape: &'a Shape, operation: &'static str) -> Result<&'a Record> {
    shape
        .as_record()
        .ok_or_else(|| ShapeError::unsupported(operation, format!("expected a record, got {shape}")))
}
