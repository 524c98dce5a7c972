//! One-call version comparison.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use vellum_diff::{diff_document, render, LocaleLabels, LocaleSet, RenderOptions, Translator};
use vellum_schema::{validate, AppConfig};
use vellum_store::DocumentSource;
use vellum_types::{CompareSelection, EntityRef, LocaleCode, VersionId};

use crate::config::ResolverConfig;
use crate::error::{VersionError, VersionResult};
use crate::permission::{filter_fields, PermissionProvider};
use crate::resolver::VersionResolver;
use crate::view::{build_view, ComparisonState, ViewInput, VersionViewModel};

/// A request to compare one version against a target.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    pub entity: EntityRef,
    pub version: VersionId,
    #[serde(default)]
    pub selection: CompareSelection,
    /// Locales to compare; empty compares every configured locale.
    #[serde(default)]
    pub locales: Vec<LocaleCode>,
    /// Locale for titles and labels.
    #[serde(default)]
    pub ui_locale: Option<LocaleCode>,
    #[serde(default)]
    pub options: RenderOptions,
}

pub struct VersionService {
    config: Arc<AppConfig>,
    resolver: VersionResolver,
    permissions: Arc<dyn PermissionProvider>,
    translator: Arc<dyn Translator>,
}

impl VersionService {
    pub fn new(
        config: Arc<AppConfig>,
        source: Arc<dyn DocumentSource>,
        permissions: Arc<dyn PermissionProvider>,
        translator: Arc<dyn Translator>,
        resolver_config: ResolverConfig,
    ) -> Self {
        let resolver = VersionResolver::new(source, permissions.clone(), resolver_config);
        Self {
            config,
            resolver,
            permissions,
            translator,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Resolve, diff and render one comparison.
    ///
    /// Schema and permission problems and missing versions are errors. A
    /// field the diff engine cannot compare yields a view whose comparison
    /// state is [`ComparisonState::Failed`].
    pub async fn compare(&self, request: &CompareRequest) -> VersionResult<VersionViewModel> {
        let entity = &request.entity;
        let entity_config = self.config.entity(entity)?;
        validate(entity_config.fields())?;
        let configured = LocaleSet::from_config(&self.config);
        if configured.matches_none(&request.locales) {
            let requested: Vec<&str> = request.locales.iter().map(LocaleCode::as_str).collect();
            return Err(VersionError::UnknownLocale(requested.join(",")));
        }
        let locales = configured.select(&request.locales);

        let resolved = self
            .resolver
            .resolve(entity, &request.version, &request.selection)
            .await?;
        let (can_update, field_permissions) = tokio::try_join!(
            self.permissions.can_update(entity),
            self.permissions.field_permissions(entity),
        )?;

        let fields = filter_fields(entity_config.fields(), &field_permissions);
        let locale_labels = LocaleLabels::from_config(&self.config);
        let translator = self.translator.as_ref();

        let outcome = diff_document(&fields, &resolved.base.data, &resolved.comparison, &locales);
        let comparison = ComparisonState::from_outcome(outcome, translator, |tree| {
            render(tree, &fields, &locale_labels, translator, &request.options)
        });
        match &comparison {
            ComparisonState::Changes { counts, .. } => info!(
                entity = %entity,
                version = %request.version,
                compare = %request.selection,
                added = counts.added,
                removed = counts.removed,
                modified = counts.modified,
                "comparison complete"
            ),
            ComparisonState::NoChanges { .. } => info!(
                entity = %entity,
                version = %request.version,
                compare = %request.selection,
                "comparison complete, no changes"
            ),
            ComparisonState::Failed { reason, .. } => tracing::warn!(
                entity = %entity,
                version = %request.version,
                %reason,
                "comparison failed"
            ),
        }

        build_view(ViewInput {
            config: &self.config,
            entity,
            resolved: &resolved,
            locales: &locales,
            ui_locale: request.ui_locale.as_ref(),
            can_update,
            api: &self.resolver.config().api,
            translator,
            comparison,
        })
    }
}
