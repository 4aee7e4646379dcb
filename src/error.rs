//! Error types for the engine, the declaration loader and the pipeline.

use thiserror::Error;

/// Engine result type
pub type Result<T, E = ShapeError> = std::result::Result<T, E>;

/// Failure of a single shape operation. Inputs are never touched on failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// A key argument names a field the record does not have.
    #[error("unknown key `{key}` (record has: {})", .available.join(", "))]
    UnknownKey { key: String, available: Vec<String> },

    /// The input shapes fall outside what the operation defines.
    #[error("{operation} is not defined for this input: {reason}")]
    UnsupportedOperation {
        operation: &'static str,
        reason: String,
    },
}

impl ShapeError {
    pub(crate) fn unsupported(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::UnsupportedOperation { operation, reason: reason.into() }
    }
}

/// Problems turning a JSON declaration into shapes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("at JSON path {path} → {message}")]
    Json { path: String, message: String },

    #[error("reference to undeclared definition `{0}`")]
    UnknownReference(String),

    #[error("no definition named `{0}`")]
    UnknownDefinition(String),
}

/// A directive pipeline stopped at `step`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("step {step} ({op}) failed: {source}")]
    Shape {
        step: usize,
        op: &'static str,
        #[source]
        source: ShapeError,
    },

    #[error("step {step} ({op}) has an invalid shape parameter: {source}")]
    Parameter {
        step: usize,
        op: &'static str,
        #[source]
        source: LoadError,
    },
}
