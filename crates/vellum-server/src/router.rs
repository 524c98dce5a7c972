use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all Vellum endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route(
            "/v1/collections/:slug/:id/versions/:version/compare",
            get(handler::compare_collection_handler),
        )
        .route(
            "/v1/globals/:slug/versions/:version/compare",
            get(handler::compare_global_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// [`build_router`] plus a permissive CORS layer for browser clients.
pub fn build_router_with_cors(state: AppState) -> Router {
    build_router(state).layer(CorsLayer::permissive())
}
