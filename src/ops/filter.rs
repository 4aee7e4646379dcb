//! Compatibility-driven filters over record fields and union members.

use super::expect_record;
use crate::compat::Checker;
use crate::error::Result;
use crate::shape::{Record, Shape};

/// Fields whose shape is compatible with `matching`, in their original order.
#[tracing::instrument(level = "debug", skip_all)]
pub fn pick_by_type(shape: &Shape, matching: &Shape) -> Result<Shape> {
    select_fields(shape, matching, true, "pick_by_type")
}

/// Fields whose shape is not compatible with `matching`.
#[tracing::instrument(level = "debug", skip_all)]
pub fn exclude_by_type(shape: &Shape, matching: &Shape) -> Result<Shape> {
    select_fields(shape, matching, false, "exclude_by_type")
}

/// Remove from `shape` whatever is compatible with `excluded`.
///
/// Unions lose matching members (collapsing to one member or `Never`); any
/// other shape becomes `Never` when it matches and is returned as-is when not.
#[tracing::instrument(level = "debug", skip_all)]
pub fn exclude_type(shape: &Shape, excluded: &Shape) -> Shape {
    let mut checker = Checker::default();
    match shape.resolve() {
        Shape::Union(members) => Shape::union(
            members
                .iter()
                .filter(|m| !checker.check(m, excluded))
                .cloned(),
        ),
        _ if checker.check(shape, excluded) => Shape::Never,
        _ => shape.clone(),
    }
}

fn select_fields(shape: &Shape, matching: &Shape, keep: bool, operation: &'static str) -> Result<Shape> {
    let record = expect_record(shape, operation)?;
    let mut checker = Checker::default();
    let out: Record = record
        .iter()
        .filter(|(_, field)| checker.check(&field.shape, matching) == keep)
        .map(|(name, field)| (name, field.clone()))
        .collect();
    Ok(Shape::record(out))
}
