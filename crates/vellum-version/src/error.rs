//! Comparison-level errors.

use vellum_diff::DiffError;
use vellum_schema::SchemaError;
use vellum_store::StoreError;

use crate::permission::Action;

/// Errors that abort a version comparison.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("invalid schema: {0}")]
    Schema(SchemaError),

    #[error("not found: {0}")]
    NotFound(String),

    /// Carries the entity and action only, never field values.
    #[error("permission denied: cannot {action} {entity}")]
    Permission { entity: String, action: Action },

    #[error("field `{path}` has unsupported type `{kind}`")]
    UnsupportedField { path: String, kind: String },

    #[error("transport error: {0}")]
    Transport(String),

    /// None of the requested locales is configured.
    #[error("no configured locale among: {0}")]
    UnknownLocale(String),
}

pub type VersionResult<T> = Result<T, VersionError>;

impl From<SchemaError> for VersionError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::UnknownEntity { slug } => Self::NotFound(slug),
            other => Self::Schema(other),
        }
    }
}

impl From<DiffError> for VersionError {
    fn from(err: DiffError) -> Self {
        match err {
            DiffError::UnsupportedField { path, kind } => Self::UnsupportedField { path, kind },
            DiffError::Schema(e) => Self::Schema(e),
        }
    }
}

impl From<StoreError> for VersionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Forbidden { resource } => Self::Permission {
                entity: resource,
                action: Action::Read,
            },
            StoreError::UnknownEntity(entity) => Self::NotFound(entity),
            other => Self::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_fetch_is_a_permission_error() {
        let err = VersionError::from(StoreError::Forbidden {
            resource: "posts/42".into(),
        });
        assert_eq!(
            err,
            VersionError::Permission {
                entity: "posts/42".into(),
                action: Action::Read
            }
        );
        assert_eq!(err.to_string(), "permission denied: cannot read posts/42");
    }

    #[test]
    fn unsupported_field_keeps_path() {
        let err = VersionError::from(DiffError::UnsupportedField {
            path: "meta.geo".into(),
            kind: "geo".into(),
        });
        assert!(err.to_string().contains("meta.geo"));
    }

    #[test]
    fn unknown_entity_is_not_found() {
        let err = VersionError::from(SchemaError::UnknownEntity { slug: "nope".into() });
        assert_eq!(err, VersionError::NotFound("nope".into()));
    }

    #[test]
    fn transport_failures_keep_message() {
        let err = VersionError::from(StoreError::Status {
            url: "http://x/api/posts/1".into(),
            status: 500,
        });
        assert!(matches!(err, VersionError::Transport(ref m) if m.contains("500")));
    }
}
