use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;
use super::auth::require_auth;
use super::handlers;

pub fn create_router(state: AppState) -> Router {
    // Public routes, no authentication
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render));

    // Protected API routes: Bearer token required when API_TOKEN is set
    let protected = Router::new()
        // Scanning and analysis
        .route("/api/portfolio", post(handlers::portfolio::scan))
        .route("/api/analyze", post(handlers::analyze::analyze))
        // Strategy registry
        .route("/api/strategies", get(handlers::strategies::list).post(handlers::strategies::publish))
        .route("/api/strategies/:id", get(handlers::strategies::detail))
        .route("/api/strategies/:id/uri", put(handlers::strategies::update_uri))
        .route("/api/registry/stats", get(handlers::strategies::stats))
        .route("/api/registry/creators/:address", get(handlers::strategies::by_creator))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
