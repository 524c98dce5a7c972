use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use vellum_types::{DocumentData, EntityRef};

use crate::error::{StoreError, StoreResult};
use crate::request::{versions_url, ApiConfig, FetchRequest};
use crate::snapshot::{VersionSnapshot, VersionSummary};
use crate::traits::DocumentSource;

/// Document source that reads from a CMS REST API.
///
/// `404` maps to absence, `401`/`403` to [`StoreError::Forbidden`]. Any
/// other non-success status is a [`StoreError::Status`].
#[derive(Clone)]
pub struct HttpDocumentSource {
    client: Client,
    api: ApiConfig,
    token: Option<String>,
}

#[derive(Deserialize)]
struct Paginated<T> {
    docs: Vec<T>,
}

impl HttpDocumentSource {
    pub fn new(api: ApiConfig) -> Self {
        Self::with_client(api, Client::new())
    }

    pub fn with_client(api: ApiConfig, client: Client) -> Self {
        Self {
            client,
            api,
            token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn api(&self) -> &ApiConfig {
        &self.api
    }

    fn get(&self, url: &str) -> RequestBuilder {
        let builder = self.client.get(url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        url: &str,
        builder: RequestBuilder,
    ) -> StoreResult<Option<T>> {
        let response = builder
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        tracing::debug!(url, status = status.as_u16(), "http fetch");
        match status {
            StatusCode::NOT_FOUND => return Ok(None),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(StoreError::Forbidden {
                    resource: url.to_string(),
                })
            }
            s if !s.is_success() => {
                return Err(StoreError::Status {
                    url: url.to_string(),
                    status: s.as_u16(),
                })
            }
            _ => {}
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl DocumentSource for HttpDocumentSource {
    async fn fetch_document(&self, request: &FetchRequest) -> StoreResult<Option<DocumentData>> {
        let builder = self.get(&request.url).query(&request.params.query());
        self.send(&request.url, builder).await
    }

    async fn fetch_version(&self, request: &FetchRequest) -> StoreResult<Option<VersionSnapshot>> {
        let builder = self.get(&request.url).query(&request.params.query());
        let snapshot: Option<VersionSnapshot> = self.send(&request.url, builder).await?;
        Ok(snapshot.map(VersionSnapshot::normalize_status))
    }

    async fn list_versions(
        &self,
        entity: &EntityRef,
        limit: usize,
    ) -> StoreResult<Vec<VersionSummary>> {
        let url = versions_url(&self.api, entity);
        let mut query = vec![
            ("depth", "0".to_string()),
            ("sort", "-updatedAt".to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(id) = entity.document_id() {
            query.push(("where[parent][equals]", id.to_string()));
        }
        let builder = self.get(&url).query(&query);
        let page: Option<Paginated<VersionSnapshot>> = self.send(&url, builder).await?;
        Ok(page
            .map(|p| {
                p.docs
                    .into_iter()
                    .map(|v| v.normalize_status().summary())
                    .collect()
            })
            .unwrap_or_default())
    }
}
