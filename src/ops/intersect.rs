//! Union-to-intersection over record unions.

use rustc_hash::FxHashMap;

use crate::error::{Result, ShapeError};
use crate::shape::identity::NodePair;
use crate::shape::{Field, Record, Shape, ShapeRef};

const OP: &str = "union_to_intersection";

/// Collapse a union of records into one record holding every member's
/// fields, in order of first appearance.
///
/// A field declared by several members gets the intersection of their
/// shapes; it stays optional only if every declaring member has it optional,
/// and turns read-only if any member has it read-only. A lone record is
/// returned unchanged.
#[tracing::instrument(level = "debug", skip_all)]
pub fn union_to_intersection(shape: &Shape) -> Result<Shape> {
    let members: Vec<&Record> = match shape.resolve() {
        Shape::Record(_) => return Ok(shape.clone()),
        Shape::Union(members) => members
            .iter()
            .map(|m| {
                m.as_record().ok_or_else(|| {
                    ShapeError::unsupported(OP, format!("union member {m} is not a record"))
                })
            })
            .collect::<Result<_>>()?,
        other => {
            return Err(ShapeError::unsupported(OP, format!("expected a union of records, got {other}")));
        }
    };
    Ok(Shape::record(Intersector::default().merge_records(&members)))
}

/// Pairwise shape intersection. Node pairs met across a reference are
/// memoized, so recursive records merge into a recursive result instead of
/// unrolling forever.
#[derive(Default)]
struct Intersector {
    memo: FxHashMap<NodePair, ShapeRef>,
}

impl Intersector {
    fn merge_records(&mut self, members: &[&Record]) -> Record {
        let mut out = Record::new();
        for record in members {
            for (name, field) in record.iter() {
                let merged = match out.get(name) {
                    None => field.clone(),
                    Some(seen) => Field {
                        shape: self.intersect(&seen.shape, &field.shape),
                        optional: seen.optional && field.optional,
                        readonly: seen.readonly || field.readonly,
                    },
                };
                out.insert(name, merged);
            }
        }
        out
    }

    fn intersect(&mut self, a: &Shape, b: &Shape) -> Shape {
        if a == b {
            return a.clone();
        }
        match Shape::ref_pair(a, b) {
            Some(pair) => self.intersect_across_refs(pair, a, b),
            None => self.intersect_resolved(a, b),
        }
    }

    fn intersect_across_refs(&mut self, pair: NodePair, a: &Shape, b: &Shape) -> Shape {
        if let Some(done) = self.memo.get(&pair) {
            return Shape::Ref(done.clone());
        }
        let (ra, rb) = (a.resolve(), b.resolve());
        if matches!(ra, Shape::Ref(_)) || matches!(rb, Shape::Ref(_)) {
            return Shape::intersection([a.clone(), b.clone()]);
        }
        let name = match (a, b) {
            (Shape::Ref(x), Shape::Ref(y)) => format!("{} & {}", x.name(), y.name()),
            (Shape::Ref(x), _) | (_, Shape::Ref(x)) => x.name().to_string(),
            _ => OP.to_string(),
        };
        let out = ShapeRef::declare(name);
        self.memo.insert(pair, out.clone());
        let merged = self.intersect_resolved(ra, rb);
        // declared above, bound only here
        let _ = out.bind(merged);
        Shape::Ref(out)
    }

    fn intersect_resolved(&mut self, a: &Shape, b: &Shape) -> Shape {
        match (a.resolve(), b.resolve()) {
            (Shape::Never, _) | (_, Shape::Never) => Shape::Never,
            (Shape::Primitive(x), Shape::Primitive(y)) if x == y => a.clone(),
            (Shape::Primitive(_), Shape::Primitive(_)) => Shape::Never,
            (Shape::Record(x), Shape::Record(y)) => Shape::record(self.merge_records(&[&**x, &**y])),
            _ => Shape::intersection([a.clone(), b.clone()]),
        }
    }
}
