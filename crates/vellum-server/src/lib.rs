//! HTTP API for Vellum version comparisons.
//!
//! Serves the version view model of collection documents and globals as
//! JSON, backed by an in-memory store or a CMS REST API.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::{ServerConfig, SourceConfig};
pub use error::{ServerError, ServerResult};
pub use handler::{AppState, CompareQuery};
pub use server::{seeded_store, SeedVersion, VellumServer};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::util::ServiceExt;
    use vellum_diff::DefaultTranslator;
    use vellum_schema::AppConfig;
    use vellum_store::InMemoryDocumentStore;
    use vellum_types::{DocumentData, DocumentId, EntityRef, VersionId};
    use vellum_version::{
        AllowAll, PermissionProvider, ResolverConfig, Scope, StaticPermissions, VersionService,
    };

    const APP: &str = r#"
[localization]
defaultLocale = "en"
locales = [{ code = "en", label = "English" }, { code = "de", label = "Deutsch" }]

[[collections]]
slug = "posts"
labels = { singular = "Post", plural = "Posts" }
admin = { useAsTitle = "title" }
versions = { drafts = true }
fields = [
  { type = "text", name = "title", localized = true },
  { type = "array", name = "tags", fields = [{ type = "text", name = "tag" }] },
]

[[globals]]
slug = "header"
fields = [{ type = "text", name = "tagline" }, { type = "geo", name = "location" }]
"#;

    fn data(value: Value) -> DocumentData {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn post() -> EntityRef {
        EntityRef::collection("posts", DocumentId::new("42").unwrap())
    }

    struct Fixture {
        store: Arc<InMemoryDocumentStore>,
        config: Arc<AppConfig>,
    }

    impl Fixture {
        fn new() -> Self {
            let config = Arc::new(AppConfig::from_toml_str(APP).unwrap());
            let store = Arc::new(InMemoryDocumentStore::new(config.clone()));
            Self { store, config }
        }

        fn app(&self, permissions: Arc<dyn PermissionProvider>) -> axum::Router {
            let service = VersionService::new(
                self.config.clone(),
                self.store.clone(),
                permissions,
                Arc::new(DefaultTranslator),
                ResolverConfig::from_app(&self.config),
            );
            router::build_router(AppState::new(service))
        }
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn seed_post(fx: &Fixture) -> VersionId {
        let v1 = fx
            .store
            .publish(&post(), data(json!({"title": {"en": "Hello"}, "tags": [{"tag": "a"}]})))
            .unwrap();
        fx.store
            .save_draft(
                &post(),
                data(json!({"title": {"en": "Hello World"}, "tags": [{"tag": "a"}, {"tag": "b"}]})),
            )
            .unwrap();
        v1.id
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (status, body) = get(Fixture::new().app(Arc::new(AllowAll)), "/v1/health").await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn info_endpoint() {
        let (status, body) = get(Fixture::new().app(Arc::new(AllowAll)), "/v1/info").await;
        assert_eq!(status, 200);
        assert_eq!(body["name"], "vellum-server");
        assert_eq!(body["collections"], json!(["posts"]));
        assert_eq!(body["locales"], json!(["en", "de"]));
    }

    #[tokio::test]
    async fn compare_collection_version() {
        let fx = Fixture::new();
        let v1 = seed_post(&fx);
        let uri = format!("/v1/collections/posts/42/versions/{v1}/compare?compare=mostRecent&locales=en");
        let (status, body) = get(fx.app(Arc::new(AllowAll)), &uri).await;

        assert_eq!(status, 200);
        assert_eq!(body["comparison"]["state"], "changes");
        assert_eq!(body["comparison"]["counts"]["modified"], 1);
        assert_eq!(body["comparison"]["counts"]["added"], 1);
        assert_eq!(body["selectedLocales"], json!(["en"]));
        assert_eq!(body["breadcrumb"][0]["label"], "Posts");
        assert!(body["restore"]["url"].as_str().unwrap().ends_with(&format!("/posts/versions/{v1}")));
    }

    #[tokio::test]
    async fn hide_unchanged_drops_unchanged_rows() {
        let fx = Fixture::new();
        let v1 = seed_post(&fx);
        let uri = format!("/v1/collections/posts/42/versions/{v1}/compare?hideUnchanged=true");
        let (_, body) = get(fx.app(Arc::new(AllowAll)), &uri).await;
        let rows = body["comparison"]["rows"].as_array().unwrap();
        assert!(rows.iter().all(|r| r["change"] != "unchanged"));
    }

    #[tokio::test]
    async fn missing_version_is_404() {
        let fx = Fixture::new();
        let v1 = seed_post(&fx);
        let uri = format!("/v1/collections/posts/42/versions/{v1}/compare?compare=does-not-exist");
        let (status, body) = get(fx.app(Arc::new(AllowAll)), &uri).await;
        assert_eq!(status, 404);
        assert!(body["error"].as_str().unwrap().contains("does-not-exist"));
    }

    #[tokio::test]
    async fn unreadable_entity_is_403() {
        let fx = Fixture::new();
        let v1 = seed_post(&fx);
        let perms = StaticPermissions::new().allow_read(Scope::Global("header".into()));
        let uri = format!("/v1/collections/posts/42/versions/{v1}/compare");
        let (status, _) = get(fx.app(Arc::new(perms)), &uri).await;
        assert_eq!(status, 403);
    }

    #[tokio::test]
    async fn unsupported_field_is_422_with_failed_state() {
        let fx = Fixture::new();
        let header = EntityRef::global("header");
        let v1 = fx.store.publish(&header, data(json!({"tagline": "Hi"}))).unwrap();
        let uri = format!("/v1/globals/header/versions/{}/compare", v1.id);
        let (status, body) = get(fx.app(Arc::new(AllowAll)), &uri).await;
        assert_eq!(status, 422);
        assert_eq!(body["comparison"]["state"], "failed");
        assert!(body["comparison"]["reason"].as_str().unwrap().contains("location"));
    }

    #[tokio::test]
    async fn unknown_collection_is_404() {
        let (status, _) = get(
            Fixture::new().app(Arc::new(AllowAll)),
            "/v1/collections/nope/1/versions/v1/compare",
        )
        .await;
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn unconfigured_locale_is_400() {
        let fx = Fixture::new();
        let v1 = seed_post(&fx);
        let uri = format!("/v1/collections/posts/42/versions/{v1}/compare?locales=fr");
        let (status, body) = get(fx.app(Arc::new(AllowAll)), &uri).await;
        assert_eq!(status, 400);
        assert!(body["error"].as_str().unwrap().contains("fr"));
    }

    #[tokio::test]
    async fn bad_locale_is_400() {
        let fx = Fixture::new();
        let v1 = seed_post(&fx);
        let uri = format!("/v1/collections/posts/42/versions/{v1}/compare?locales=e%20n");
        let (status, _) = get(fx.app(Arc::new(AllowAll)), &uri).await;
        assert_eq!(status, 400);
    }
}
