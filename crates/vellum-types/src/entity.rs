use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::DocumentId;

/// The entity whose version history is being inspected.
///
/// Collections hold many documents addressed by id; globals are singletons
/// addressed by slug alone.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EntityRef {
    Collection { slug: String, id: DocumentId },
    Global { slug: String },
}

impl EntityRef {
    pub fn collection(slug: impl Into<String>, id: DocumentId) -> Self {
        Self::Collection {
            slug: slug.into(),
            id,
        }
    }

    pub fn global(slug: impl Into<String>) -> Self {
        Self::Global { slug: slug.into() }
    }

    /// The collection or global slug.
    pub fn slug(&self) -> &str {
        match self {
            Self::Collection { slug, .. } | Self::Global { slug } => slug,
        }
    }

    /// The document id, for collection documents.
    pub fn document_id(&self) -> Option<&DocumentId> {
        match self {
            Self::Collection { id, .. } => Some(id),
            Self::Global { .. } => None,
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global { .. })
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collection { slug, id } => write!(f, "{slug}/{id}"),
            Self::Global { slug } => write!(f, "globals/{slug}"),
        }
    }
}
