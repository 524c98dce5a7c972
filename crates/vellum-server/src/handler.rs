use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;
use vellum_diff::RenderOptions;
use vellum_types::{CompareSelection, DocumentId, EntityRef, LocaleCode, VersionId};
use vellum_version::{CompareRequest, VersionService};

use crate::error::{ServerError, ServerResult};

/// Shared state of every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<VersionService>,
}

impl AppState {
    pub fn new(service: VersionService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Query string of the compare endpoints.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareQuery {
    /// `mostRecent`, `published` or a version id.
    pub compare: Option<String>,
    /// Comma-separated locale codes.
    pub locales: Option<String>,
    pub hide_unchanged: Option<bool>,
    /// UI locale for titles.
    pub locale: Option<String>,
}

impl CompareQuery {
    pub fn into_request(
        self,
        entity: EntityRef,
        version: VersionId,
    ) -> ServerResult<CompareRequest> {
        let selection = match self.compare.as_deref() {
            None => CompareSelection::default(),
            Some(raw) => raw
                .parse()
                .map_err(|e| ServerError::BadRequest(format!("compare: {e}")))?,
        };
        let locales = self
            .locales
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(locale)
            .collect::<ServerResult<Vec<_>>>()?;
        let ui_locale = self.locale.as_deref().map(locale).transpose()?;
        Ok(CompareRequest {
            entity,
            version,
            selection,
            locales,
            ui_locale,
            options: RenderOptions {
                hide_unchanged: self.hide_unchanged.unwrap_or(false),
            },
        })
    }
}

fn locale(code: &str) -> ServerResult<LocaleCode> {
    LocaleCode::new(code).map_err(|e| ServerError::BadRequest(e.to_string()))
}

fn version_id(raw: String) -> ServerResult<VersionId> {
    VersionId::new(raw).map_err(|e| ServerError::BadRequest(format!("version: {e}")))
}

pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn info_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.service.config();
    Json(json!({
        "name": "vellum-server",
        "version": env!("CARGO_PKG_VERSION"),
        "collections": config.collections.iter().map(|c| c.slug.as_str()).collect::<Vec<_>>(),
        "globals": config.globals.iter().map(|g| g.slug.as_str()).collect::<Vec<_>>(),
        "locales": config.locale_codes(),
    }))
}

pub async fn compare_collection_handler(
    State(state): State<AppState>,
    Path((slug, id, version)): Path<(String, String, String)>,
    Query(query): Query<CompareQuery>,
) -> ServerResult<Response> {
    let id = DocumentId::new(id).map_err(|e| ServerError::BadRequest(format!("id: {e}")))?;
    compare(&state, EntityRef::collection(slug, id), version_id(version)?, query).await
}

pub async fn compare_global_handler(
    State(state): State<AppState>,
    Path((slug, version)): Path<(String, String)>,
    Query(query): Query<CompareQuery>,
) -> ServerResult<Response> {
    compare(&state, EntityRef::global(slug), version_id(version)?, query).await
}

async fn compare(
    state: &AppState,
    entity: EntityRef,
    version: VersionId,
    query: CompareQuery,
) -> ServerResult<Response> {
    let request = query.into_request(entity, version)?;
    let view = state.service.compare(&request).await?;
    let status = if view.comparison.is_failed() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    Ok((status, Json(view)).into_response())
}
