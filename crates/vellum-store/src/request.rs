use std::fmt;

use serde::{Deserialize, Serialize};
use vellum_types::{EntityRef, LocaleCode, VersionId};

/// Relationship population depth used by comparisons.
pub const DEFAULT_DEPTH: u32 = 1;

/// Where the REST API lives. Passed explicitly; there is no ambient config.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// Origin, e.g. `https://cms.example.com`. Empty for same-origin paths.
    pub server_url: String,
    /// Mount path of the API, e.g. `/api`.
    pub api_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            api_path: "/api".into(),
        }
    }
}

impl ApiConfig {
    pub fn new(server_url: impl Into<String>, api_path: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            api_path: api_path.into(),
        }
    }

    fn base(&self) -> String {
        format!(
            "{}/{}",
            self.server_url.trim_end_matches('/'),
            self.api_path.trim_matches('/')
        )
    }
}

/// Locale selector sent with every fetch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LocaleParam {
    /// `*`: localized fields come back as `{ locale: value }` maps.
    #[default]
    All,
    /// A single locale: localized fields come back flattened.
    Code(LocaleCode),
}

impl fmt::Display for LocaleParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("*"),
            Self::Code(code) => f.write_str(code.as_str()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchParams {
    pub depth: u32,
    pub locale: LocaleParam,
    /// Include unpublished drafts when reading the current document.
    pub draft: bool,
}

impl Default for FetchParams {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            locale: LocaleParam::All,
            draft: false,
        }
    }
}

impl FetchParams {
    pub fn with_draft(mut self, draft: bool) -> Self {
        self.draft = draft;
        self
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("depth", self.depth.to_string()),
            ("locale", self.locale.to_string()),
            ("draft", self.draft.to_string()),
        ]
    }
}

/// The thing a request addresses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resource {
    /// Current state of a collection document or global.
    Document(EntityRef),
    /// One historical version of an entity.
    Version { entity: EntityRef, version: VersionId },
}

impl Resource {
    pub fn entity(&self) -> &EntityRef {
        match self {
            Self::Document(entity) | Self::Version { entity, .. } => entity,
        }
    }

    pub fn url(&self, api: &ApiConfig) -> String {
        match self {
            Self::Document(entity) => document_url(api, entity),
            Self::Version { entity, version } => {
                format!("{}/{}", versions_url(api, entity), version)
            }
        }
    }
}

/// URL of the current document or global.
pub fn document_url(api: &ApiConfig, entity: &EntityRef) -> String {
    match entity {
        EntityRef::Collection { slug, id } => format!("{}/{slug}/{id}", api.base()),
        EntityRef::Global { slug } => format!("{}/globals/{slug}", api.base()),
    }
}

/// URL of the version listing of a collection or global.
pub fn versions_url(api: &ApiConfig, entity: &EntityRef) -> String {
    match entity {
        EntityRef::Collection { slug, .. } => format!("{}/{slug}/versions", api.base()),
        EntityRef::Global { slug } => format!("{}/globals/{slug}/versions", api.base()),
    }
}

/// A fully addressed fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    pub resource: Resource,
    pub url: String,
    pub params: FetchParams,
}

impl FetchRequest {
    pub fn new(resource: Resource, api: &ApiConfig, params: FetchParams) -> Self {
        let url = resource.url(api);
        Self {
            resource,
            url,
            params,
        }
    }

    pub fn document(entity: &EntityRef, api: &ApiConfig, params: FetchParams) -> Self {
        Self::new(Resource::Document(entity.clone()), api, params)
    }

    pub fn version(
        entity: &EntityRef,
        version: &VersionId,
        api: &ApiConfig,
        params: FetchParams,
    ) -> Self {
        Self::new(
            Resource::Version {
                entity: entity.clone(),
                version: version.clone(),
            },
            api,
            params,
        )
    }
}
