use serde::{Deserialize, Serialize};
use serde_json::Value;
use vellum_types::{DocumentData, DocumentId, Timestamp, VersionId};

/// Key under which documents record their draft/published state.
pub const STATUS_KEY: &str = "_status";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionStatus {
    #[default]
    Draft,
    Published,
}

impl VersionStatus {
    /// Read the status recorded in document data, if any.
    pub fn from_data(data: &DocumentData) -> Option<Self> {
        match data.get(STATUS_KEY).and_then(Value::as_str) {
            Some("published") => Some(Self::Published),
            Some("draft") => Some(Self::Draft),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }
}

/// One immutable historical version of a document or global.
///
/// The field values live under `version` on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSnapshot {
    pub id: VersionId,
    /// Owning document; absent for globals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<DocumentId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub autosave: bool,
    #[serde(default)]
    pub status: VersionStatus,
    #[serde(rename = "version", default)]
    pub data: DocumentData,
}

impl VersionSnapshot {
    /// Prefer the status stored inside the version data over the envelope.
    pub fn normalize_status(mut self) -> Self {
        if let Some(status) = VersionStatus::from_data(&self.data) {
            self.status = status;
        }
        self
    }

    pub fn is_published(&self) -> bool {
        self.status == VersionStatus::Published
    }

    pub fn summary(&self) -> VersionSummary {
        VersionSummary {
            id: self.id.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            autosave: self.autosave,
            status: self.status,
        }
    }
}

/// Version metadata without field values, as listed for compare options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSummary {
    pub id: VersionId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub autosave: bool,
    pub status: VersionStatus,
}
