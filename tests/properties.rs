//! Property-based tests for the shape operators.
//!
//! Records are generated over a small key pool so merges and omits overlap
//! often; leaves mix primitives, `null`, and nominal tags. Cyclic shapes are
//! self-referential lists whose back edge is either a bare optional
//! reference or a `Self | null` union, optionally behind an inline record.

use proptest::prelude::*;
use shape_algebra::ops::{
    assert_keys, deep_partial, deep_readonly, exclude_by_type, flatten, merge, nullable_keys,
    pick_by_type, strict_omit,
};
use shape_algebra::{compatible, Field, Record, Shape, ShapeError, ShapeRef};

// -- Strategies --

fn key() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "d", "e", "f"]).prop_map(String::from)
}

fn leaf() -> impl Strategy<Value = Shape> {
    prop_oneof![
        Just(Shape::string()),
        Just(Shape::number()),
        Just(Shape::boolean()),
        Just(Shape::null()),
        "[A-Z][a-z]{1,4}".prop_map(|tag| Shape::nominal(Shape::number(), tag)),
    ]
}

fn record_of<S>(inner: S) -> impl Strategy<Value = Shape>
where
    S: Strategy<Value = Shape>,
{
    prop::collection::vec((key(), inner, any::<bool>(), any::<bool>()), 0..6).prop_map(|fields| {
        Shape::record(
            fields
                .into_iter()
                .map(|(k, shape, optional, readonly)| (k, Field { shape, optional, readonly }))
                .collect(),
        )
    })
}

fn shape() -> impl Strategy<Value = Shape> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(|members| Shape::union(members)),
            record_of(inner),
        ]
    })
}

fn record() -> impl Strategy<Value = Shape> {
    record_of(shape())
}

/// How a generated list points back at itself.
#[derive(Clone, Copy, Debug)]
struct Back {
    through_union: bool,
    behind_inline: bool,
}

fn back() -> impl Strategy<Value = Back> {
    (any::<bool>(), any::<bool>())
        .prop_map(|(through_union, behind_inline)| Back { through_union, behind_inline })
}

/// `{ value: leaf; next: Self | null }` or `{ value: leaf; next?: Self }`,
/// with `next` optionally wrapped as `{ next: ... }`.
fn list_of(value: Shape, back: Back) -> Shape {
    let node = ShapeRef::declare("List");
    let mut next = if back.through_union {
        Field::required(Shape::union([Shape::reference(&node), Shape::null()]))
    } else {
        Field::optional(Shape::reference(&node))
    };
    if back.behind_inline {
        next = Field::required(Shape::record(Record::new().with("next", next)));
    }
    let body = Record::new().with("value", Field::required(value)).with("next", next);
    node.bind(Shape::record(body)).unwrap();
    Shape::reference(&node)
}

fn cyclic() -> impl Strategy<Value = Shape> {
    (leaf(), back()).prop_map(|(value, back)| list_of(value, back))
}

fn keys_of(t: &Shape) -> Vec<String> {
    t.as_record()
        .map(|r| r.keys().map(String::from).collect())
        .unwrap_or_default()
}

/// A record and two disjoint subsets of its keys.
fn record_with_split_keys() -> impl Strategy<Value = (Shape, Vec<String>, Vec<String>)> {
    record().prop_flat_map(|t| {
        let keys = keys_of(&t);
        let n = keys.len();
        (Just(t), prop::sample::subsequence(keys, 0..=n), any::<prop::sample::Index>())
    })
    .prop_map(|(t, picked, at)| {
        let split = at.index(picked.len() + 1);
        let (k1, k2) = picked.split_at(split);
        (t, k1.to_vec(), k2.to_vec())
    })
}

// -- Properties --

proptest! {
    #[test]
    fn strict_omit_removes_exactly_the_keys((t, k1, k2) in record_with_split_keys()) {
        let all: Vec<String> = k1.iter().chain(&k2).cloned().collect();
        let out = strict_omit(&t, &all).unwrap();
        let expected: Vec<String> = keys_of(&t).into_iter().filter(|k| !all.contains(k)).collect();
        prop_assert_eq!(keys_of(&out), expected);
    }

    #[test]
    fn strict_omit_composes((t, k1, k2) in record_with_split_keys()) {
        let stepwise = strict_omit(&strict_omit(&t, &k1).unwrap(), &k2).unwrap();
        let all: Vec<String> = k1.iter().chain(&k2).cloned().collect();
        let at_once = strict_omit(&t, &all).unwrap();
        prop_assert_eq!(stepwise, at_once);
    }

    #[test]
    fn keys_outside_the_record_are_rejected(t in record()) {
        let missing = ["zz"];
        let is_unknown = |r: Result<Shape, ShapeError>| matches!(r, Err(ShapeError::UnknownKey { .. }));
        prop_assert!(is_unknown(strict_omit(&t, &missing)));
        prop_assert!(is_unknown(assert_keys(&t, &missing)));
        prop_assert!(is_unknown(nullable_keys(&t, &missing)));
    }

    #[test]
    fn deep_operators_are_idempotent(t in shape()) {
        let partial = deep_partial(&t);
        prop_assert_eq!(deep_partial(&partial), partial);
        let frozen = deep_readonly(&t);
        prop_assert_eq!(deep_readonly(&frozen), frozen);
    }

    #[test]
    fn flatten_is_identity(t in shape()) {
        prop_assert_eq!(flatten(&t), t);
    }

    #[test]
    fn merge_covers_both_and_second_wins(f in record(), s in record()) {
        let out = merge(&f, &s).unwrap();
        let out_rec = out.as_record().unwrap();
        let (fr, sr) = (f.as_record().unwrap(), s.as_record().unwrap());

        let mut expected = keys_of(&f);
        expected.extend(keys_of(&s).into_iter().filter(|k| !fr.contains_key(k)));
        prop_assert_eq!(keys_of(&out), expected);

        for (name, field) in sr.iter() {
            prop_assert_eq!(&out_rec.get(name).unwrap().shape, &field.shape);
        }
    }

    #[test]
    fn union_ignores_member_order(members in prop::collection::vec(leaf(), 1..6).prop_shuffle()) {
        let mut reversed = members.clone();
        reversed.reverse();
        prop_assert_eq!(Shape::union(members), Shape::union(reversed));
    }

    #[test]
    fn compatibility_is_reflexive(t in shape()) {
        prop_assert!(compatible(&t, &t));
    }

    #[test]
    fn records_are_compatible_with_their_deep_partial(t in record()) {
        prop_assert!(compatible(&t, &deep_partial(&t)));
    }

    #[test]
    fn cyclic_shapes_are_self_compatible_and_equal(t in cyclic()) {
        prop_assert!(compatible(&t, &t));
        prop_assert_eq!(flatten(&t), t.clone());
        let partial = deep_partial(&t);
        prop_assert_eq!(deep_partial(&partial), partial.clone());
        prop_assert!(compatible(&t, &partial));
        let frozen = deep_readonly(&t);
        prop_assert_eq!(deep_readonly(&frozen), frozen);
    }

    #[test]
    fn twin_lists_follow_their_values(l in leaf(), r in leaf(), b in back()) {
        let (left, right) = (list_of(l.clone(), b), list_of(r.clone(), b));
        prop_assert_eq!(compatible(&left, &right), compatible(&l, &r));
        prop_assert_eq!(left == right, l == r);
    }

    #[test]
    fn lists_unrolled_twice_equal_the_plain_list(l in leaf(), through_union in any::<bool>()) {
        let back = Back { through_union, behind_inline: false };
        let tail = |s: Shape| {
            if through_union {
                Field::required(Shape::union([s, Shape::null()]))
            } else {
                Field::optional(s)
            }
        };
        let plain = list_of(l.clone(), back);

        let node = ShapeRef::declare("Twice");
        let inner = Record::new()
            .with("value", Field::required(l.clone()))
            .with("next", tail(Shape::reference(&node)));
        let outer = Record::new()
            .with("value", Field::required(l.clone()))
            .with("next", tail(Shape::record(inner)));
        node.bind(Shape::record(outer)).unwrap();
        let twice = Shape::reference(&node);
        // one step ahead of `twice`, so its references sit at odd depths
        let shifted = Shape::record(
            Record::new()
                .with("value", Field::required(l))
                .with("next", tail(twice.clone())),
        );

        for other in [&twice, &shifted] {
            prop_assert_eq!(other, &plain);
            prop_assert!(compatible(other, &plain) && compatible(&plain, other));
        }
    }

    #[test]
    fn filters_partition_cyclic_records(t in cyclic(), matching in prop_oneof![leaf(), cyclic()]) {
        let picked = keys_of(&pick_by_type(&t, &matching).unwrap());
        let rest = keys_of(&exclude_by_type(&t, &matching).unwrap());
        let mut all: Vec<String> = picked.iter().chain(&rest).cloned().collect();
        all.sort();
        let mut expected = keys_of(&t);
        expected.sort();
        prop_assert_eq!(all, expected);
    }
}
