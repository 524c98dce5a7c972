//! Everything a version page displays, assembled from a resolution and a
//! diff outcome.

use serde::Serialize;
use vellum_diff::{ChangeCounts, DiffError, DiffTree, LocaleSet, RenderNode, Translator};
use vellum_schema::{AppConfig, EntityConfig, LocaleOption};
use vellum_store::{ApiConfig, Resource, VersionStatus};
use vellum_types::{CompareSelection, DocumentId, EntityRef, LocaleCode, VersionId};

use crate::breadcrumb::{derive_breadcrumb, document_label, format_date, BreadcrumbInput, NavItem};
use crate::error::{VersionError, VersionResult};
use crate::resolver::ResolvedVersions;

/// Outcome of the diff step. "Nothing changed" and "could not compare" are
/// separate states.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ComparisonState {
    NoChanges {
        message: String,
    },
    Changes {
        counts: ChangeCounts,
        rows: Vec<RenderNode>,
    },
    Failed {
        reason: String,
        message: String,
    },
}

impl ComparisonState {
    pub fn from_outcome(
        outcome: Result<DiffTree, DiffError>,
        translator: &dyn Translator,
        render: impl FnOnce(&DiffTree) -> Vec<RenderNode>,
    ) -> Self {
        match outcome {
            Ok(tree) if tree.is_unchanged() => Self::NoChanges {
                message: translator.translate("version:noChanges", &[]),
            },
            Ok(tree) => Self::Changes {
                counts: tree.counts(),
                rows: render(&tree),
            },
            Err(err) => {
                let reason = VersionError::from(err).to_string();
                let message =
                    translator.translate("version:comparisonFailed", &[("reason", &reason)]);
                Self::Failed { reason, message }
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
}

/// How to restore the inspected version. Only offered to callers who may
/// update the entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreAction {
    pub label: String,
    pub method: &'static str,
    pub url: String,
    pub version_id: VersionId,
    pub version_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_doc_id: Option<DocumentId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareOption {
    pub value: CompareSelection,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VersionStatus>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub autosave: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionViewModel {
    pub entity: EntityRef,
    pub version_id: VersionId,
    pub status: VersionStatus,
    /// Formatted creation date of the inspected version.
    pub heading: String,
    pub intro: String,
    pub meta: PageMeta,
    pub breadcrumb: Vec<NavItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restore: Option<RestoreAction>,
    pub compare_options: Vec<CompareOption>,
    pub selected: CompareSelection,
    pub locale_options: Vec<LocaleOption>,
    pub selected_locales: Vec<LocaleCode>,
    pub comparison: ComparisonState,
}

pub struct ViewInput<'a> {
    pub config: &'a AppConfig,
    pub entity: &'a EntityRef,
    pub resolved: &'a ResolvedVersions,
    pub locales: &'a LocaleSet,
    /// Locale used for titles and labels.
    pub ui_locale: Option<&'a LocaleCode>,
    pub can_update: bool,
    pub api: &'a ApiConfig,
    pub translator: &'a dyn Translator,
    pub comparison: ComparisonState,
}

pub fn build_view(input: ViewInput<'_>) -> VersionResult<VersionViewModel> {
    let ViewInput {
        config,
        entity,
        resolved,
        locales,
        ui_locale,
        can_update,
        api,
        translator,
        comparison,
    } = input;
    let entity_config = config.entity(entity)?;
    let base = &resolved.base;
    let date_format = config.admin.date_format.as_str();
    let heading = format_date(base.created_at, date_format);

    let version_word = translator.translate(
        if base.autosave {
            "version:autosavedVersion"
        } else {
            "version:version"
        },
        &[],
    );
    let intro = translator.translate("version:versionCreatedOn", &[("version", &version_word)]);

    let breadcrumb = derive_breadcrumb(&BreadcrumbInput {
        config: entity_config,
        entity,
        admin_route: &config.routes.admin,
        most_recent: resolved.most_recent.as_ref(),
        created_at: base.created_at,
        locale: ui_locale,
        date_format,
        translator,
    });

    let restore = can_update.then(|| RestoreAction {
        label: translator.translate("version:restoreThisVersion", &[]),
        method: "POST",
        url: Resource::Version {
            entity: entity.clone(),
            version: base.id.clone(),
        }
        .url(api),
        version_id: base.id.clone(),
        version_date: heading.clone(),
        original_doc_id: entity.document_id().cloned(),
    });

    Ok(VersionViewModel {
        entity: entity.clone(),
        version_id: base.id.clone(),
        status: base.status,
        meta: page_meta(entity_config, resolved, &heading, ui_locale, translator),
        heading,
        intro,
        breadcrumb,
        restore,
        compare_options: compare_options(resolved, date_format, translator),
        selected: resolved.selection.clone(),
        locale_options: config
            .localization
            .as_ref()
            .map(|l| l.locales.clone())
            .unwrap_or_default(),
        selected_locales: locales.codes().to_vec(),
        comparison,
    })
}

fn page_meta(
    entity_config: EntityConfig<'_>,
    resolved: &ResolvedVersions,
    date: &str,
    ui_locale: Option<&LocaleCode>,
    translator: &dyn Translator,
) -> PageMeta {
    let version = translator.translate("version:version", &[]);
    let entity_label = translator.translate(&entity_config.singular_label(), &[]);
    match entity_config {
        EntityConfig::Collection(collection) => {
            let title = document_label(collection, &resolved.base.data, ui_locale, translator);
            PageMeta {
                title: format!("{version} - {date} - {title} - {entity_label}"),
                description: translator.translate(
                    "version:viewingVersion",
                    &[("documentTitle", &title), ("entityLabel", &entity_label)],
                ),
            }
        }
        EntityConfig::Global(_) => PageMeta {
            title: format!("{version} - {date} - {entity_label}"),
            description: translator
                .translate("version:viewingVersionGlobal", &[("entityLabel", &entity_label)]),
        },
    }
}

/// Most recent, then published when there is one, then every other version
/// newest first.
fn compare_options(
    resolved: &ResolvedVersions,
    date_format: &str,
    translator: &dyn Translator,
) -> Vec<CompareOption> {
    let mut options = vec![CompareOption {
        value: CompareSelection::MostRecent,
        label: translator.translate("version:mostRecent", &[]),
        status: None,
        autosave: false,
    }];
    if resolved.published.is_some() {
        options.push(CompareOption {
            value: CompareSelection::Published,
            label: translator.translate("version:published", &[]),
            status: None,
            autosave: false,
        });
    }
    options.extend(
        resolved
            .history
            .iter()
            .filter(|summary| summary.id != resolved.base.id)
            .map(|summary| CompareOption {
                value: CompareSelection::SpecificVersion(summary.id.clone()),
                label: format_date(summary.updated_at, date_format),
                status: Some(summary.status),
                autosave: summary.autosave,
            }),
    );
    options
}
