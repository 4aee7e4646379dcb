//! Node identity and the assumption table behind the cyclic comparisons.
//!
//! Equality, compatibility and intersection walk two graphs in lockstep.
//! Every step that crosses a reference on either side is keyed by the pair
//! of nodes involved, so a walk over finite graphs visits each pair once
//! even when the two sides cycle with different periods.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::Shape;

/// Allocation identity of one shape node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

pub(crate) type NodePair = (NodeId, NodeId);

impl Shape {
    /// `None` for `Never`, which has no allocation and no children.
    pub(crate) fn node_id(&self) -> Option<NodeId> {
        let addr = match self {
            Shape::Never => return None,
            Shape::Primitive(name) => Arc::as_ptr(name).cast::<()>() as usize,
            Shape::Record(r) => Arc::as_ptr(r).cast::<()>() as usize,
            Shape::Union(members) | Shape::Intersection(members) => {
                Arc::as_ptr(members).cast::<()>() as usize
            }
            Shape::Nominal(n) => Arc::as_ptr(n).cast::<()>() as usize,
            Shape::Ref(r) => r.addr(),
        };
        Some(NodeId(addr))
    }

    /// Key for a lockstep step, when either side is a reference.
    pub(crate) fn ref_pair(a: &Shape, b: &Shape) -> Option<NodePair> {
        if matches!(a, Shape::Ref(_)) || matches!(b, Shape::Ref(_)) {
            a.node_id().zip(b.node_id())
        } else {
            None
        }
    }
}

/// Outcome of looking a pair up in [`Assumptions`].
pub(crate) enum Visit {
    /// Under comparison further up, or already shown to hold.
    Assumed,
    Refuted,
    /// Newly assumed; hand the mark back to [`Assumptions::settle`].
    Open(usize),
}

/// Coinductive memo: a pair holds while it is being compared.
///
/// When a pair fails, every assumption made since it was entered is
/// withdrawn (they may have leaned on it) and the pair is remembered as
/// refuted. Refutations are never withdrawn: failing under extra
/// assumptions means failing without them too.
#[derive(Default)]
pub(crate) struct Assumptions {
    assumed: FxHashSet<NodePair>,
    trail: Vec<NodePair>,
    refuted: FxHashSet<NodePair>,
}

impl Assumptions {
    pub(crate) fn enter(&mut self, pair: NodePair) -> Visit {
        if self.assumed.contains(&pair) {
            return Visit::Assumed;
        }
        if self.refuted.contains(&pair) {
            return Visit::Refuted;
        }
        let mark = self.trail.len();
        self.assumed.insert(pair);
        self.trail.push(pair);
        Visit::Open(mark)
    }

    pub(crate) fn settle(&mut self, mark: usize, holds: bool) {
        if holds || mark >= self.trail.len() {
            return;
        }
        let pair = self.trail[mark];
        for withdrawn in self.trail.drain(mark..) {
            self.assumed.remove(&withdrawn);
        }
        self.refuted.insert(pair);
    }
}
