use serde::{Deserialize, Serialize};
use vellum_schema::AppConfig;
use vellum_store::{ApiConfig, DEFAULT_DEPTH};

/// Settings for snapshot resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverConfig {
    pub api: ApiConfig,
    /// Relationship population depth for every fetch.
    pub depth: u32,
    /// Maximum number of versions offered as compare targets.
    pub history_limit: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            depth: DEFAULT_DEPTH,
            history_limit: 25,
        }
    }
}

impl ResolverConfig {
    /// Resolver settings addressing the API described by `config`.
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            api: ApiConfig::new(config.server_url.clone(), config.routes.api.clone()),
            ..Self::default()
        }
    }
}
