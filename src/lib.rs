//! Shape algebra: structural type descriptions and the utility-type
//! transformations over them (omit, assert, nullable, deep partial/readonly,
//! pick/exclude by type, merge, nominal tags, union to intersection).
//!
//! Shapes are immutable and `Send + Sync`. Every operation borrows its
//! inputs, returns a fresh shape, and keeps no state beyond the call.
pub mod compat;
pub mod decl;
pub mod error;
pub mod fold;
pub mod ops;
pub mod pipeline;
pub mod render;
pub mod shape;

pub use compat::compatible;
pub use error::{LoadError, PipelineError, ShapeError};
pub use pipeline::{Directive, Pipeline};
pub use shape::{Field, Nominal, Record, Shape, ShapeRef};
