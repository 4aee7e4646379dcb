//! Normal forms for unions and intersections.
//!
//! Both constructors flatten nested members of their own kind and drop
//! structural duplicates. They differ only in how `Never` is absorbed.

use super::Shape;

/// `Never` members vanish; nothing left is `Never`; one left is that member.
pub(crate) fn normalize_union<I: IntoIterator<Item = Shape>>(members: I) -> Shape {
    let mut arms = Vec::<Shape>::new();
    for m in members {
        push_flat(&mut arms, m, Kind::Union);
    }
    arms.retain(|t| !t.is_never());
    match arms.len() {
        0 => Shape::Never,
        1 => arms.remove(0),
        _ => Shape::Union(arms.into()),
    }
}

/// A `Never` member makes the whole thing `Never`.
pub(crate) fn normalize_intersection<I: IntoIterator<Item = Shape>>(members: I) -> Shape {
    let mut arms = Vec::<Shape>::new();
    for m in members {
        push_flat(&mut arms, m, Kind::Intersection);
    }
    if arms.iter().any(Shape::is_never) {
        return Shape::Never;
    }
    match arms.len() {
        // the empty conjunction has no shape of its own here; treat as bottom
        0 => Shape::Never,
        1 => arms.remove(0),
        _ => Shape::Intersection(arms.into()),
    }
}

#[derive(Clone, Copy)]
enum Kind {
    Union,
    Intersection,
}

fn push_flat(arms: &mut Vec<Shape>, member: Shape, kind: Kind) {
    match (kind, &member) {
        (Kind::Union, Shape::Union(inner)) | (Kind::Intersection, Shape::Intersection(inner)) => {
            for m in inner.iter() {
                push_flat(arms, m.clone(), kind);
            }
        }
        _ => {
            if !arms.contains(&member) {
                arms.push(member);
            }
        }
    }
}
