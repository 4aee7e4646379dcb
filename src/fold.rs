//! Rebuilding traversal over shape graphs.
//!
//! Implementors override the hook they care about (usually `fold_field`)
//! and inherit the rest. References are folded once per folder: the first
//! visit declares a fresh output reference and memoizes it before folding
//! the target, so later visits (including the ones a cycle makes) reuse it.

use rustc_hash::FxHashMap;

use crate::shape::{Field, Nominal, Record, RefId, Shape, ShapeRef};

pub type RefMemo = FxHashMap<RefId, ShapeRef>;

pub trait ShapeFolder {
    /// Input reference → output reference, private to one top-level call.
    fn memo(&mut self) -> &mut RefMemo;

    fn fold(&mut self, shape: &Shape) -> Shape {
        match shape {
            Shape::Never | Shape::Primitive(_) => shape.clone(),
            Shape::Record(record) => self.fold_record(record),
            Shape::Union(members) => Shape::union(members.iter().map(|m| self.fold(m))),
            Shape::Intersection(members) => {
                Shape::intersection(members.iter().map(|m| self.fold(m)))
            }
            Shape::Nominal(nominal) => self.fold_nominal(nominal),
            Shape::Ref(reference) => self.fold_ref(reference),
        }
    }

    fn fold_record(&mut self, record: &Record) -> Shape {
        let fields: Record = record
            .iter()
            .map(|(name, field)| (name, self.fold_field(field)))
            .collect();
        Shape::record(fields)
    }

    fn fold_field(&mut self, field: &Field) -> Field {
        field.with_shape(self.fold(&field.shape))
    }

    fn fold_nominal(&mut self, nominal: &Nominal) -> Shape {
        Shape::nominal(self.fold(&nominal.base), nominal.tag.clone())
    }

    fn fold_ref(&mut self, reference: &ShapeRef) -> Shape {
        if let Some(done) = self.memo().get(&reference.id()) {
            tracing::trace!(name = reference.name(), "fold memo hit");
            return Shape::Ref(done.clone());
        }
        let Some(target) = reference.target() else {
            return Shape::Ref(reference.clone());
        };
        let out = ShapeRef::declare(reference.name());
        self.memo().insert(reference.id(), out.clone());
        let folded = self.fold(target);
        // `out` was declared above and is bound nowhere else
        let _ = out.bind(folded);
        Shape::Ref(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountFields {
        memo: RefMemo,
        seen: usize,
    }

    impl ShapeFolder for CountFields {
        fn memo(&mut self) -> &mut RefMemo {
            &mut self.memo
        }
        fn fold_field(&mut self, field: &Field) -> Field {
            self.seen += 1;
            field.with_shape(self.fold(&field.shape))
        }
    }

    #[test]
    fn each_reference_is_visited_once() {
        let node = ShapeRef::declare("Node");
        let body = Record::new()
            .with("left", Field::optional(Shape::reference(&node)))
            .with("right", Field::optional(Shape::reference(&node)));
        node.bind(Shape::record(body)).unwrap();

        let mut folder = CountFields::default();
        let out = folder.fold(&Shape::reference(&node));
        assert_eq!(folder.seen, 2);
        assert_eq!(folder.memo.len(), 1);
        assert_eq!(out, Shape::reference(&node));
        match &out {
            Shape::Ref(r) => assert!(!r.ptr_eq(&node)),
            other => panic!("expected a reference, got {other:?}"),
        }
    }
}
