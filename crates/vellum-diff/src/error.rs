//! Error types for the diff crate.

use vellum_schema::SchemaError;

/// Errors that can occur while diffing two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// The schema declares a field type with no comparison strategy.
    #[error("field `{path}` has unsupported type `{kind}`")]
    UnsupportedField { path: String, kind: String },

    /// The schema failed validation.
    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
