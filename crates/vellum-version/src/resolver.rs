//! Fetch everything a version comparison needs.
//!
//! One resolution issues up to five independent reads: the version under
//! inspection, the published document, the most recent (draft-inclusive)
//! document, the version history and, for a specific compare target, that
//! target version. They run concurrently; the first failure aborts the
//! whole resolution.

use std::sync::Arc;

use tracing::{debug, info};
use vellum_store::{
    DocumentSource, FetchParams, FetchRequest, LocaleParam, VersionSnapshot, VersionSummary,
};
use vellum_types::{CompareSelection, DocumentData, EntityRef, VersionId};

use crate::config::ResolverConfig;
use crate::error::{VersionError, VersionResult};
use crate::permission::{Action, PermissionProvider};

/// The snapshots of one comparison.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedVersions {
    /// The version under inspection.
    pub base: VersionSnapshot,
    pub selection: CompareSelection,
    /// Field data of the compare target.
    pub comparison: DocumentData,
    /// The target version, when comparing against a specific version.
    pub target: Option<VersionSnapshot>,
    pub published: Option<DocumentData>,
    pub most_recent: Option<DocumentData>,
    /// Newest first.
    pub history: Vec<VersionSummary>,
}

pub struct VersionResolver {
    source: Arc<dyn DocumentSource>,
    permissions: Arc<dyn PermissionProvider>,
    config: ResolverConfig,
}

impl VersionResolver {
    pub fn new(
        source: Arc<dyn DocumentSource>,
        permissions: Arc<dyn PermissionProvider>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            source,
            permissions,
            config,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve the base version and the compare target for `entity`.
    ///
    /// Read permission is checked before anything is fetched.
    pub async fn resolve(
        &self,
        entity: &EntityRef,
        version: &VersionId,
        selection: &CompareSelection,
    ) -> VersionResult<ResolvedVersions> {
        if !self.permissions.can_read(entity).await? {
            return Err(VersionError::Permission {
                entity: entity.to_string(),
                action: Action::Read,
            });
        }

        let api = &self.config.api;
        let params = FetchParams {
            depth: self.config.depth,
            locale: LocaleParam::All,
            draft: false,
        };
        let base_request = FetchRequest::version(entity, version, api, params.clone());
        let published_request = FetchRequest::document(entity, api, params.clone());
        let recent_request = FetchRequest::document(entity, api, params.clone().with_draft(true));
        let target_request = selection
            .version_id()
            .map(|id| FetchRequest::version(entity, id, api, params.with_draft(true)));

        let (base, published, most_recent, history, target) = tokio::try_join!(
            self.fetch_version(entity, &base_request),
            self.fetch_document(&published_request),
            self.fetch_document(&recent_request),
            self.list_versions(entity),
            self.fetch_target(entity, target_request.as_ref()),
        )?;

        let comparison = match selection {
            CompareSelection::MostRecent => most_recent
                .clone()
                .ok_or_else(|| VersionError::NotFound(format!("current state of {entity}")))?,
            CompareSelection::Published => published
                .clone()
                .ok_or_else(|| VersionError::NotFound(format!("published state of {entity}")))?,
            CompareSelection::SpecificVersion(id) => target
                .as_ref()
                .map(|t| t.data.clone())
                .ok_or_else(|| VersionError::NotFound(format!("version {id} of {entity}")))?,
        };

        info!(
            entity = %entity,
            version = %version,
            compare = %selection,
            history = history.len(),
            "resolved versions"
        );
        Ok(ResolvedVersions {
            base,
            selection: selection.clone(),
            comparison,
            target,
            published,
            most_recent,
            history,
        })
    }

    async fn fetch_version(
        &self,
        entity: &EntityRef,
        request: &FetchRequest,
    ) -> VersionResult<VersionSnapshot> {
        debug!(url = %request.url, "fetching version");
        let snapshot = self
            .source
            .fetch_version(request)
            .await?
            .map(VersionSnapshot::normalize_status)
            .filter(|s| belongs_to(s, entity))
            .ok_or_else(|| VersionError::NotFound(request.url.clone()))?;
        Ok(snapshot)
    }

    async fn fetch_target(
        &self,
        entity: &EntityRef,
        request: Option<&FetchRequest>,
    ) -> VersionResult<Option<VersionSnapshot>> {
        match request {
            Some(request) => self.fetch_version(entity, request).await.map(Some),
            None => Ok(None),
        }
    }

    async fn fetch_document(&self, request: &FetchRequest) -> VersionResult<Option<DocumentData>> {
        debug!(url = %request.url, draft = request.params.draft, "fetching document");
        Ok(self.source.fetch_document(request).await?)
    }

    async fn list_versions(&self, entity: &EntityRef) -> VersionResult<Vec<VersionSummary>> {
        debug!(entity = %entity, limit = self.config.history_limit, "listing versions");
        Ok(self
            .source
            .list_versions(entity, self.config.history_limit)
            .await?)
    }
}

/// A collection version must name its document as parent.
fn belongs_to(snapshot: &VersionSnapshot, entity: &EntityRef) -> bool {
    match (entity.document_id(), &snapshot.parent) {
        (Some(id), Some(parent)) => id == parent,
        _ => true,
    }
}
