//! Serializable operator chains.
//!
//! ```json
//! [ { "op": "strict_omit", "keys": ["password"] },
//!   { "op": "nullable_keys", "keys": ["avatar"] },
//!   { "op": "deep_readonly" } ]
//! ```
//!
//! Shape parameters are declarations resolved against the definitions of the
//! document the root came from.

use serde::{Deserialize, Serialize};

use crate::decl::{Definitions, ShapeDecl};
use crate::error::{LoadError, PipelineError};
use crate::ops;
use crate::shape::Shape;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Directive {
    AssertKeys { keys: Vec<String> },
    StrictOmit { keys: Vec<String> },
    /// Every key when `keys` is absent.
    NullableKeys {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        keys: Option<Vec<String>>,
    },
    DeepPartial,
    DeepReadonly,
    Flatten,
    PickByType { shape: ShapeDecl },
    ExcludeByType { shape: ShapeDecl },
    Merge { with: ShapeDecl },
    Nominal { tag: String },
    ExcludeType { shape: ShapeDecl },
    UnionToIntersection,
}

impl Directive {
    pub fn name(&self) -> &'static str {
        match self {
            Directive::AssertKeys { .. } => "assert_keys",
            Directive::StrictOmit { .. } => "strict_omit",
            Directive::NullableKeys { .. } => "nullable_keys",
            Directive::DeepPartial => "deep_partial",
            Directive::DeepReadonly => "deep_readonly",
            Directive::Flatten => "flatten",
            Directive::PickByType { .. } => "pick_by_type",
            Directive::ExcludeByType { .. } => "exclude_by_type",
            Directive::Merge { .. } => "merge",
            Directive::Nominal { .. } => "nominal",
            Directive::ExcludeType { .. } => "exclude_type",
            Directive::UnionToIntersection => "union_to_intersection",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pipeline {
    pub steps: Vec<Directive>,
}

impl Pipeline {
    pub fn from_json(src: &str) -> Result<Self, LoadError> {
        crate::decl::from_str_with_path(src)
    }

    /// Run the steps left to right. The first failure stops the run.
    pub fn apply(&self, root: &Shape, defs: &Definitions) -> Result<Shape, PipelineError> {
        let mut current = root.clone();
        for (step, directive) in self.steps.iter().enumerate() {
            tracing::debug!(step, op = directive.name(), "applying directive");
            current = apply_one(&current, directive, defs, step)?;
        }
        Ok(current)
    }
}

fn apply_one(shape: &Shape, directive: &Directive, defs: &Definitions, step: usize) -> Result<Shape, PipelineError> {
    let op = directive.name();
    let param = |decl: &ShapeDecl| {
        defs.shape_of(decl)
            .map_err(|source| PipelineError::Parameter { step, op, source })
    };
    let out = match directive {
        Directive::AssertKeys { keys } => ops::assert_keys(shape, keys),
        Directive::StrictOmit { keys } => ops::strict_omit(shape, keys),
        Directive::NullableKeys { keys: Some(keys) } => ops::nullable_keys(shape, keys),
        Directive::NullableKeys { keys: None } => ops::nullable_all_keys(shape),
        Directive::DeepPartial => Ok(ops::deep_partial(shape)),
        Directive::DeepReadonly => Ok(ops::deep_readonly(shape)),
        Directive::Flatten => Ok(ops::flatten(shape)),
        Directive::PickByType { shape: matching } => ops::pick_by_type(shape, &param(matching)?),
        Directive::ExcludeByType { shape: matching } => ops::exclude_by_type(shape, &param(matching)?),
        Directive::Merge { with } => ops::merge(shape, &param(with)?),
        Directive::Nominal { tag } => Ok(ops::nominal(shape, tag)),
        Directive::ExcludeType { shape: excluded } => Ok(ops::exclude_type(shape, &param(excluded)?)),
        Directive::UnionToIntersection => ops::union_to_intersection(shape),
    };
    out.map_err(|source| PipelineError::Shape { step, op, source })
}
