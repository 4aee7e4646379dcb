//! Structural shape model.
//!
//! A `Shape` is an immutable, cheaply clonable description of a value's
//! type: primitives, ordered records, unions, intersections, nominal tags,
//! and named references. References are the only way to express a cycle.
//!
//! Equality is structural. Unions and intersections compare as sets, record
//! fields compare by name, and references compare by what they point at
//! (a pair of nodes already under comparison is assumed equal, so cyclic
//! graphs terminate).
pub(crate) mod identity;
pub mod record;
pub mod reference;
pub mod union;

use std::sync::Arc;

use rustc_hash::FxHashSet;

use identity::{Assumptions, Visit};
pub use record::{Field, Record};
pub use reference::{RefId, ShapeRef};

pub const NULL: &str = "null";
pub const UNDEFINED: &str = "undefined";

// ------------------------------- Model ----------------------------------- //

#[derive(Clone, Debug)]
pub enum Shape {
    /// Bottom: no value inhabits it.
    Never,
    Primitive(Arc<str>),
    Record(Arc<Record>),
    /// Built through [`Shape::union`], which keeps it normalized.
    Union(Arc<[Shape]>),
    /// Built through [`Shape::intersection`].
    Intersection(Arc<[Shape]>),
    Nominal(Arc<Nominal>),
    Ref(ShapeRef),
}

#[derive(Clone, Debug)]
pub struct Nominal {
    pub base: Shape,
    pub tag: String,
}

impl Shape {
    pub fn primitive(name: impl Into<Arc<str>>) -> Self {
        Shape::Primitive(name.into())
    }

    pub fn string() -> Self { Self::primitive("string") }
    pub fn number() -> Self { Self::primitive("number") }
    pub fn boolean() -> Self { Self::primitive("boolean") }
    pub fn null() -> Self { Self::primitive(NULL) }
    pub fn undefined() -> Self { Self::primitive(UNDEFINED) }

    pub fn record(record: Record) -> Self {
        Shape::Record(Arc::new(record))
    }

    pub fn union<I: IntoIterator<Item = Shape>>(members: I) -> Self {
        union::normalize_union(members)
    }

    pub fn intersection<I: IntoIterator<Item = Shape>>(members: I) -> Self {
        union::normalize_intersection(members)
    }

    pub fn nominal(base: Shape, tag: impl Into<String>) -> Self {
        Shape::Nominal(Arc::new(Nominal { base, tag: tag.into() }))
    }

    pub fn reference(r: &ShapeRef) -> Self {
        Shape::Ref(r.clone())
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Shape::Never)
    }

    /// `null` or `undefined`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Shape::Primitive(n) if &**n == NULL || &**n == UNDEFINED)
    }

    /// Follow bound references to the first non-reference shape.
    ///
    /// Unbound references, and reference chains that loop without ever
    /// reaching a structural shape, resolve to themselves.
    pub fn resolve(&self) -> &Shape {
        let mut current = self;
        let mut seen = FxHashSet::default();
        while let Shape::Ref(r) = current {
            if !seen.insert(r.id()) {
                break;
            }
            match r.target() {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    /// The record behind this shape, looking through references.
    pub fn as_record(&self) -> Option<&Record> {
        match self.resolve() {
            Shape::Record(r) => Some(r),
            _ => None,
        }
    }
}

// ------------------------------ Equality --------------------------------- //

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        Bisim::default().eq(self, other)
    }
}

impl Eq for Shape {}

/// Structural equality as a bisimulation: node pairs met across a
/// reference are assumed equal until shown otherwise.
#[derive(Default)]
struct Bisim {
    memo: Assumptions,
}

impl Bisim {
    fn eq(&mut self, a: &Shape, b: &Shape) -> bool {
        if let (Shape::Ref(x), Shape::Ref(y)) = (a, b) {
            if x.ptr_eq(y) {
                return true;
            }
        }
        let Some(pair) = Shape::ref_pair(a, b) else {
            return self.eq_resolved(a.resolve(), b.resolve());
        };
        match self.memo.enter(pair) {
            Visit::Assumed => true,
            Visit::Refuted => false,
            Visit::Open(mark) => {
                let same = self.eq_resolved(a.resolve(), b.resolve());
                self.memo.settle(mark, same);
                same
            }
        }
    }

    fn eq_resolved(&mut self, a: &Shape, b: &Shape) -> bool {
        match (a, b) {
            // unbound, or a loop of bare references
            (Shape::Ref(x), Shape::Ref(y)) => x.ptr_eq(y),
            (Shape::Never, Shape::Never) => true,
            (Shape::Primitive(x), Shape::Primitive(y)) => x == y,
            (Shape::Record(x), Shape::Record(y)) => {
                Arc::ptr_eq(x, y)
                    || (x.len() == y.len()
                        && x.iter().all(|(name, fx)| match y.get(name) {
                            Some(fy) => {
                                fx.optional == fy.optional
                                    && fx.readonly == fy.readonly
                                    && self.eq(&fx.shape, &fy.shape)
                            }
                            None => false,
                        }))
            }
            (Shape::Union(xs), Shape::Union(ys))
            | (Shape::Intersection(xs), Shape::Intersection(ys)) => {
                xs.iter().all(|x| ys.iter().any(|y| self.eq(x, y)))
                    && ys.iter().all(|y| xs.iter().any(|x| self.eq(x, y)))
            }
            (Shape::Nominal(x), Shape::Nominal(y)) => x.tag == y.tag && self.eq(&x.base, &y.base),
            _ => false,
        }
    }
}
