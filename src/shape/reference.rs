use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::Shape;

/// Identity of a reference node. Memo tables key on this, never on the name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefId(usize);

/// Named, write-once pointer to another shape.
///
/// The only way to close a cycle: declare the reference, build shapes that
/// mention it, then bind it to the finished shape. Clones share the node.
#[derive(Clone)]
pub struct ShapeRef(Arc<RefNode>);

struct RefNode {
    name: String,
    target: OnceCell<Shape>,
}

impl ShapeRef {
    /// Unbound reference; [`ShapeRef::bind`] it before handing it out.
    pub fn declare(name: impl Into<String>) -> Self {
        Self(Arc::new(RefNode { name: name.into(), target: OnceCell::new() }))
    }

    pub fn bound(name: impl Into<String>, target: Shape) -> Self {
        let out = Self::declare(name);
        // fresh cell
        let _ = out.0.target.set(target);
        out
    }

    /// Bind the target. Hands the shape back if the reference was already bound.
    pub fn bind(&self, target: Shape) -> Result<(), Shape> {
        self.0.target.set(target)
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn target(&self) -> Option<&Shape> {
        self.0.target.get()
    }

    pub fn is_bound(&self) -> bool {
        self.0.target.get().is_some()
    }

    pub fn id(&self) -> RefId {
        RefId(self.addr())
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

// Targets may point back at this node; print the name only.
impl fmt::Debug for ShapeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeRef")
            .field("name", &self.0.name)
            .field("bound", &self.is_bound())
            .finish()
    }
}
