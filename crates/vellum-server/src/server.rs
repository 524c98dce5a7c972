use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tokio::net::TcpListener;
use vellum_diff::DefaultTranslator;
use vellum_schema::AppConfig;
use vellum_store::{
    ApiConfig, DocumentSource, HttpDocumentSource, InMemoryDocumentStore, VersionSnapshot,
};
use vellum_types::EntityRef;
use vellum_version::{AllowAll, VersionService};

use crate::config::{ServerConfig, SourceConfig};
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::{build_router, build_router_with_cors};

/// One entry of a memory seed file: a version and the entity it belongs to.
#[derive(Clone, Debug, Deserialize)]
pub struct SeedVersion {
    pub entity: EntityRef,
    #[serde(flatten)]
    pub snapshot: VersionSnapshot,
}

/// Build a memory store holding the versions listed in a JSON seed file,
/// in file order.
pub fn seeded_store(config: Arc<AppConfig>, seed: &Path) -> ServerResult<InMemoryDocumentStore> {
    let raw = std::fs::read_to_string(seed)?;
    let versions: Vec<SeedVersion> = serde_json::from_str(&raw)
        .map_err(|e| ServerError::Config(format!("{}: {e}", seed.display())))?;
    let store = InMemoryDocumentStore::new(config);
    for SeedVersion { entity, snapshot } in versions {
        store.insert_version(&entity, snapshot.normalize_status())?;
    }
    Ok(store)
}

/// Vellum comparison server.
pub struct VellumServer {
    config: ServerConfig,
    state: AppState,
}

impl VellumServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Load the application config and set up the configured document
    /// source. Every caller may read and update everything.
    pub fn from_config(config: ServerConfig) -> ServerResult<Self> {
        let app = Arc::new(AppConfig::load(&config.app_config)?);
        app.validate()?;

        let source: Arc<dyn DocumentSource> = match &config.source {
            SourceConfig::Memory { seed: None } => {
                Arc::new(InMemoryDocumentStore::new(app.clone()))
            }
            SourceConfig::Memory { seed: Some(seed) } => Arc::new(seeded_store(app.clone(), seed)?),
            SourceConfig::Http { token } => {
                let http = HttpDocumentSource::new(ApiConfig::new(
                    app.server_url.clone(),
                    app.routes.api.clone(),
                ));
                Arc::new(match token {
                    Some(token) => http.with_token(token.clone()),
                    None => http,
                })
            }
        };

        let service = VersionService::new(
            app.clone(),
            source,
            Arc::new(AllowAll),
            Arc::new(DefaultTranslator),
            config.resolver_config(&app),
        );
        Ok(Self::new(config, AppState::new(service)))
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        if self.config.allow_cors {
            build_router_with_cors(self.state.clone())
        } else {
            build_router(self.state.clone())
        }
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("Vellum server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const APP: &str = r#"
[[collections]]
slug = "posts"
fields = [{ type = "text", name = "title" }]
"#;

    fn write(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn server_from_config() {
        let app = write(APP, ".toml");
        let config = ServerConfig {
            app_config: app.path().to_path_buf(),
            ..ServerConfig::default()
        };
        let server = VellumServer::from_config(config).unwrap();
        assert_eq!(server.config().bind_addr.port(), 4100);
        let _router = server.router();
    }

    #[test]
    fn missing_app_config_is_an_error() {
        let config = ServerConfig {
            app_config: "/nonexistent/vellum.toml".into(),
            ..ServerConfig::default()
        };
        assert!(matches!(VellumServer::from_config(config), Err(ServerError::Config(_))));
    }

    #[tokio::test]
    async fn seed_file_populates_memory_store() {
        let seed = write(
            r#"[
              {"entity": {"kind": "collection", "slug": "posts", "id": "1"},
               "id": "v1", "createdAt": "2024-03-01T10:00:00Z", "updatedAt": "2024-03-01T10:00:00Z",
               "version": {"title": "Hello", "_status": "published"}},
              {"entity": {"kind": "collection", "slug": "posts", "id": "1"},
               "id": "v2", "createdAt": "2024-03-02T10:00:00Z", "updatedAt": "2024-03-02T10:00:00Z",
               "version": {"title": "Hello World"}}
            ]"#,
            ".json",
        );
        let app = Arc::new(AppConfig::from_toml_str(APP).unwrap());
        let store = seeded_store(app, seed.path()).unwrap();
        let post = EntityRef::collection("posts", vellum_types::DocumentId::new("1").unwrap());
        assert_eq!(store.version_count(&post).unwrap(), 2);
        let history = store.list_versions(&post, 10).await.unwrap();
        assert_eq!(history[0].id.as_str(), "v2");
        assert!(history[1].status == vellum_store::VersionStatus::Published);
    }
}
