//! Error types for schema loading and validation.

/// Errors raised while loading or validating a field schema.
///
/// All of these are fatal for a comparison and are raised before any
/// document is fetched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("field of type {kind:?} requires a name")]
    MissingName { kind: String },

    #[error("duplicate field path: {path}")]
    DuplicatePath { path: String },

    #[error("blocks field {path} declares no block variants")]
    EmptyBlocks { path: String },

    #[error("block variant {slug:?} is declared twice in {path}")]
    DuplicateVariant { path: String, slug: String },

    #[error("field {path} collides with the block discriminant {discriminant:?}")]
    DiscriminantCollision { path: String, discriminant: String },

    #[error("relationship field {path} has no target collection")]
    MissingRelationTarget { path: String },

    #[error("no collection or global named {slug:?}")]
    UnknownEntity { slug: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// Convenience alias for schema results.
pub type SchemaResult<T> = Result<T, SchemaError>;
