//! Structural compatibility: "is a value of shape A always a value of shape B".
//!
//! Used by pick/exclude-by-type and exclude-from-union. Total on cyclic
//! graphs: a node pair met across a reference is assumed compatible while
//! under comparison, and a pair that fails is remembered as refuted, so
//! every pair is decided once per checker.

use crate::shape::identity::{Assumptions, Visit};
use crate::shape::{Record, Shape};

/// `a` is compatible with (assignable to) `b`.
pub fn compatible(a: &Shape, b: &Shape) -> bool {
    Checker::default().check(a, b)
}

/// One memo table, scoped to one top-level operation.
#[derive(Default)]
pub(crate) struct Checker {
    memo: Assumptions,
}

impl Checker {
    pub(crate) fn check(&mut self, a: &Shape, b: &Shape) -> bool {
        if let (Shape::Ref(x), Shape::Ref(y)) = (a, b) {
            if x.ptr_eq(y) {
                return true;
            }
        }
        let Some(pair) = Shape::ref_pair(a, b) else {
            return self.check_resolved(a.resolve(), b.resolve());
        };
        match self.memo.enter(pair) {
            Visit::Assumed => {
                tracing::trace!("compat memo hit");
                true
            }
            Visit::Refuted => false,
            Visit::Open(mark) => {
                let ok = self.check_resolved(a.resolve(), b.resolve());
                self.memo.settle(mark, ok);
                ok
            }
        }
    }

    fn check_resolved(&mut self, a: &Shape, b: &Shape) -> bool {
        match (a, b) {
            (Shape::Never, _) => true,
            (_, Shape::Never) => false,

            (Shape::Union(members), _) => members.iter().all(|m| self.check(m, b)),
            (_, Shape::Union(members)) => members.iter().any(|m| self.check(a, m)),

            (_, Shape::Intersection(members)) => members.iter().all(|m| self.check(a, m)),
            (Shape::Intersection(members), _) => members.iter().any(|m| self.check(m, b)),

            // unbound, or a loop of bare references
            (Shape::Ref(x), Shape::Ref(y)) => x.ptr_eq(y),

            (Shape::Primitive(x), Shape::Primitive(y)) => x == y,
            (Shape::Nominal(x), Shape::Nominal(y)) => x.tag == y.tag && self.check(&x.base, &y.base),
            (Shape::Record(x), Shape::Record(y)) => self.check_record(x, y),
            _ => false,
        }
    }

    // Width and depth: A may carry extra fields; every field B requires must
    // be required in A; optional fields of B that A declares must agree.
    fn check_record(&mut self, a: &Record, b: &Record) -> bool {
        b.iter().all(|(name, fb)| match a.get(name) {
            None => fb.optional,
            Some(fa) => (fb.optional || !fa.optional) && self.check(&fa.shape, &fb.shape),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Field, ShapeRef};

    fn rec(fields: &[(&str, Shape)]) -> Shape {
        Shape::record(fields.iter().map(|(k, s)| (*k, Field::required(s.clone()))).collect())
    }

    #[test]
    fn primitives_and_unions() {
        let s = Shape::string();
        let sn = Shape::union([Shape::string(), Shape::null()]);
        assert!(compatible(&s, &s));
        assert!(compatible(&s, &sn));
        assert!(!compatible(&sn, &s));
        assert!(!compatible(&s, &Shape::number()));
    }

    #[test]
    fn never_is_bottom() {
        assert!(compatible(&Shape::Never, &Shape::string()));
        assert!(!compatible(&Shape::string(), &Shape::Never));
        assert!(compatible(&Shape::Never, &Shape::Never));
    }

    #[test]
    fn nominal_tags_must_match() {
        let user = Shape::nominal(Shape::number(), "UserId");
        let post = Shape::nominal(Shape::number(), "PostId");
        assert!(!compatible(&user, &post));
        assert!(!compatible(&post, &user));
        assert!(compatible(&user, &Shape::nominal(Shape::number(), "UserId")));
        assert!(!compatible(&user, &Shape::number()));
        assert!(!compatible(&Shape::number(), &user));
    }

    #[test]
    fn records_are_width_and_depth_covariant() {
        let wide = rec(&[("a", Shape::string()), ("b", Shape::number())]);
        let narrow = rec(&[("a", Shape::string())]);
        assert!(compatible(&wide, &narrow));
        assert!(!compatible(&narrow, &wide));

        let loose = Shape::record(
            Record::new().with("a", Field::required(Shape::union([Shape::string(), Shape::null()]))),
        );
        assert!(compatible(&narrow, &loose));
        assert!(!compatible(&loose, &narrow));
    }

    #[test]
    fn optional_fields_need_not_be_present() {
        let with_opt = Shape::record(Record::new().with("a", Field::optional(Shape::string())));
        let empty = Shape::record(Record::new());
        assert!(compatible(&empty, &with_opt));
        assert!(!compatible(&with_opt, &rec(&[("a", Shape::string())])));
    }

    #[test]
    fn intersections() {
        let both = Shape::intersection([
            rec(&[("a", Shape::string())]),
            rec(&[("b", Shape::number())]),
        ]);
        assert!(compatible(&both, &rec(&[("a", Shape::string())])));
        let ab = rec(&[("a", Shape::string()), ("b", Shape::number())]);
        assert!(compatible(&ab, &both));
    }

    #[test]
    fn cyclic_records_terminate() {
        let make = |name: &str, leaf: Shape| {
            let node = ShapeRef::declare(name);
            let body = Record::new()
                .with("value", Field::required(leaf))
                .with("next", Field::optional(Shape::reference(&node)));
            node.bind(Shape::record(body)).unwrap();
            Shape::reference(&node)
        };
        let a = make("A", Shape::number());
        let b = make("B", Shape::number());
        let c = make("C", Shape::string());
        assert!(compatible(&a, &b));
        assert!(!compatible(&a, &c));
        assert!(compatible(&a, &a));
    }

    /// `{ value: leaf; next: Self | null }`
    fn nullable_list(name: &str, leaf: Shape) -> Shape {
        let node = ShapeRef::declare(name);
        let next = Shape::union([Shape::reference(&node), Shape::null()]);
        let body = Record::new()
            .with("value", Field::required(leaf))
            .with("next", Field::required(next));
        node.bind(Shape::record(body)).unwrap();
        Shape::reference(&node)
    }

    #[test]
    fn cycles_through_nullable_unions_terminate() {
        let a = nullable_list("A", Shape::number());
        let b = nullable_list("B", Shape::number());
        let c = nullable_list("C", Shape::string());
        let wide = nullable_list("W", Shape::union([Shape::number(), Shape::string()]));

        assert!(compatible(&a, &b));
        assert!(compatible(&b, &a));
        assert!(!compatible(&a, &c));
        assert!(!compatible(&c, &a));
        assert!(compatible(&a, &wide));
        assert!(!compatible(&wide, &a));

        let next_of_b = b.as_record().unwrap().get("next").unwrap().shape.clone();
        assert!(compatible(&a, &next_of_b));
        assert!(!compatible(&next_of_b, &a));
    }

    #[test]
    fn recursive_unions_are_checked_coinductively() {
        // U = U | null: only null inhabits it
        let u = ShapeRef::declare("U");
        u.bind(Shape::union([Shape::reference(&u), Shape::null()])).unwrap();
        let u = Shape::reference(&u);
        assert!(compatible(&u, &Shape::null()));
        assert!(!compatible(&u, &Shape::string()));
        assert!(compatible(&Shape::null(), &u));
    }

    #[test]
    fn failed_assumptions_do_not_leak_into_later_checks() {
        let a = nullable_list("A", Shape::number());
        let c = nullable_list("C", Shape::string());
        let mut checker = Checker::default();
        assert!(!checker.check(&a, &c));
        assert!(!checker.check(&a, &c));
        assert!(checker.check(&a, &a));
    }
}
