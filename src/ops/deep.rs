//! Recursive field-flag rewrites.
//!
//! All three walk the whole graph (record fields, union and intersection
//! members, nominal bases, reference targets) through [`ShapeFolder`], so
//! cycles cost one visit per reference.

use crate::fold::{RefMemo, ShapeFolder};
use crate::shape::{Field, Shape};

/// Every field of every nested record becomes optional.
#[tracing::instrument(level = "debug", skip_all)]
pub fn deep_partial(shape: &Shape) -> Shape {
    FieldRewrite::new(|f: &mut Field| f.optional = true).fold(shape)
}

/// Every field of every nested record becomes read-only.
#[tracing::instrument(level = "debug", skip_all)]
pub fn deep_readonly(shape: &Shape) -> Shape {
    FieldRewrite::new(|f: &mut Field| f.readonly = true).fold(shape)
}

/// Rebuilds the graph unchanged. Nested records stay nested; no field is
/// hoisted to the top level.
#[tracing::instrument(level = "debug", skip_all)]
pub fn flatten(shape: &Shape) -> Shape {
    FieldRewrite::new(|_: &mut Field| {}).fold(shape)
}

struct FieldRewrite<F> {
    memo: RefMemo,
    rewrite: F,
}

impl<F: Fn(&mut Field)> FieldRewrite<F> {
    fn new(rewrite: F) -> Self {
        Self { memo: RefMemo::default(), rewrite }
    }
}

impl<F: Fn(&mut Field)> ShapeFolder for FieldRewrite<F> {
    fn memo(&mut self) -> &mut RefMemo {
        &mut self.memo
    }

    fn fold_field(&mut self, field: &Field) -> Field {
        let mut out = field.with_shape(self.fold(&field.shape));
        (self.rewrite)(&mut out);
        out
    }
}
