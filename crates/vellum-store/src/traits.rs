use async_trait::async_trait;
use vellum_types::{DocumentData, EntityRef};

use crate::error::StoreResult;
use crate::request::FetchRequest;
use crate::snapshot::{VersionSnapshot, VersionSummary};

/// Read boundary for documents and their version history.
///
/// Absence is reported as `Ok(None)`; errors are reserved for refused
/// access and transport failures.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Current state of a document or global, honouring `params.draft`.
    async fn fetch_document(&self, request: &FetchRequest) -> StoreResult<Option<DocumentData>>;

    /// One historical version.
    async fn fetch_version(&self, request: &FetchRequest) -> StoreResult<Option<VersionSnapshot>>;

    /// Version history of an entity, newest first.
    async fn list_versions(
        &self,
        entity: &EntityRef,
        limit: usize,
    ) -> StoreResult<Vec<VersionSummary>>;
}
