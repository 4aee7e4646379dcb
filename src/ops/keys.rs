//! Key-directed record operators: assert, omit, nullable, merge.

use rustc_hash::FxHashSet;

use super::expect_record;
use crate::error::Result;
use crate::shape::{Field, Record, RefId, Shape};

/// Listed fields become required and lose their `null`/`undefined` members.
#[tracing::instrument(level = "debug", skip_all, fields(keys = keys.len()))]
pub fn assert_keys<K: AsRef<str>>(shape: &Shape, keys: &[K]) -> Result<Shape> {
    let record = expect_record(shape, "assert_keys")?;
    record.require_keys(keys)?;
    let listed = |name: &str| keys.iter().any(|k| k.as_ref() == name);

    let out: Record = record
        .iter()
        .map(|(name, field)| {
            if !listed(name) {
                return (name, field.clone());
            }
            let field = Field {
                shape: strip_nullish(&field.shape, &mut FxHashSet::default()),
                optional: false,
                readonly: field.readonly,
            };
            (name, field)
        })
        .collect();
    Ok(Shape::record(out))
}

/// Drop listed fields. All of them must exist.
#[tracing::instrument(level = "debug", skip_all, fields(keys = keys.len()))]
pub fn strict_omit<K: AsRef<str>>(shape: &Shape, keys: &[K]) -> Result<Shape> {
    let record = expect_record(shape, "strict_omit")?;
    record.require_keys(keys)?;

    let out: Record = record
        .iter()
        .filter(|(name, _)| !keys.iter().any(|k| k.as_ref() == *name))
        .map(|(name, field)| (name, field.clone()))
        .collect();
    Ok(Shape::record(out))
}

/// Listed fields admit `null` too. Optionality is left alone.
#[tracing::instrument(level = "debug", skip_all, fields(keys = keys.len()))]
pub fn nullable_keys<K: AsRef<str>>(shape: &Shape, keys: &[K]) -> Result<Shape> {
    let record = expect_record(shape, "nullable_keys")?;
    record.require_keys(keys)?;
    Ok(Shape::record(nullable_where(record, |name| {
        keys.iter().any(|k| k.as_ref() == name)
    })))
}

/// [`nullable_keys`] over every field.
pub fn nullable_all_keys(shape: &Shape) -> Result<Shape> {
    let record = expect_record(shape, "nullable_keys")?;
    Ok(Shape::record(nullable_where(record, |_| true)))
}

/// Fields of both; `second` wins on overlap. Order: `first`'s fields (with
/// overrides in place), then fields only `second` has.
#[tracing::instrument(level = "debug", skip_all)]
pub fn merge(first: &Shape, second: &Shape) -> Result<Shape> {
    let f = expect_record(first, "merge")?;
    let s = expect_record(second, "merge")?;

    let mut out: Record = f
        .iter()
        .map(|(name, field)| (name, s.get(name).unwrap_or(field).clone()))
        .collect();
    for (name, field) in s.iter() {
        if !f.contains_key(name) {
            out.insert(name, field.clone());
        }
    }
    Ok(Shape::record(out))
}

fn nullable_where(record: &Record, listed: impl Fn(&str) -> bool) -> Record {
    record
        .iter()
        .map(|(name, field)| {
            if listed(name) {
                (name, field.with_shape(Shape::union([field.shape.clone(), Shape::null()])))
            } else {
                (name, field.clone())
            }
        })
        .collect()
}

// A bare null/undefined field is left with nothing. Members that reference
// other unions are stripped too; a union reached again through its own
// members adds nothing new.
fn strip_nullish(shape: &Shape, seen: &mut FxHashSet<RefId>) -> Shape {
    if let Shape::Ref(r) = shape {
        if !seen.insert(r.id()) {
            return Shape::Never;
        }
    }
    match shape.resolve() {
        Shape::Union(members) => Shape::union(members.iter().map(|m| match m.resolve() {
            Shape::Union(_) => strip_nullish(m, seen),
            r if r.is_nullish() => Shape::Never,
            _ => m.clone(),
        })),
        s if s.is_nullish() => Shape::Never,
        _ => shape.clone(),
    }
}
