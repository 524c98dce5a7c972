use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vellum_schema::AppConfig;
use vellum_version::ResolverConfig;

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Collections, globals and localization.
    pub app_config: PathBuf,
    pub source: SourceConfig,
    /// Relationship population depth for snapshot fetches.
    pub depth: u32,
    /// Maximum number of versions offered as compare targets.
    pub history_limit: usize,
    pub allow_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let resolver = ResolverConfig::default();
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 4100)),
            app_config: PathBuf::from("vellum.toml"),
            source: SourceConfig::default(),
            depth: resolver.depth,
            history_limit: resolver.history_limit,
            allow_cors: false,
        }
    }
}

/// Where documents and versions are read from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SourceConfig {
    /// In-process store, optionally seeded from a JSON file.
    Memory {
        #[serde(default)]
        seed: Option<PathBuf>,
    },
    /// The CMS REST API at the configured `serverUrl` and API route.
    Http {
        #[serde(default)]
        token: Option<String>,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Memory { seed: None }
    }
}

impl ServerConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))
    }

    pub fn resolver_config(&self, app: &AppConfig) -> ResolverConfig {
        ResolverConfig {
            depth: self.depth,
            history_limit: self.history_limit,
            ..ResolverConfig::from_app(app)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:4100".parse::<SocketAddr>().unwrap());
        assert_eq!(c.source, SourceConfig::Memory { seed: None });
        assert_eq!(c.depth, 1);
        assert!(!c.allow_cors);
    }

    #[test]
    fn load_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
bindAddr = "0.0.0.0:8080"
appConfig = "cms.json"
historyLimit = 10

[source]
kind = "http"
token = "secret"
"#
        )
        .unwrap();
        let c = ServerConfig::load(file.path()).unwrap();
        assert_eq!(c.bind_addr.port(), 8080);
        assert_eq!(c.app_config, PathBuf::from("cms.json"));
        assert_eq!(c.history_limit, 10);
        assert_eq!(c.source, SourceConfig::Http { token: Some("secret".into()) });
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bindAddr = 12").unwrap();
        assert!(matches!(ServerConfig::load(file.path()), Err(ServerError::Config(_))));
    }

    #[test]
    fn resolver_config_uses_app_routes() {
        let app: AppConfig = serde_json::from_value(serde_json::json!({
            "serverUrl": "https://cms.example.com",
            "routes": {"admin": "/admin", "api": "/rest"}
        }))
        .unwrap();
        let c = ServerConfig { history_limit: 5, ..ServerConfig::default() };
        let r = c.resolver_config(&app);
        assert_eq!(r.api.api_path, "/rest");
        assert_eq!(r.history_limit, 5);
    }
}
