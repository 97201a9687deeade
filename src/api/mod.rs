//! API module - Axum HTTP server and routes

mod handlers;

use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main application router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        // ==========================================
        // Status & Health
        // ==========================================
        .route("/api/health", get(handlers::health_check))
        // ==========================================
        // Price Audit
        // ==========================================
        .route("/api/price-audit", post(handlers::run_audit))
        .route("/api/price-audit/examples", get(handlers::get_examples))
        .route(
            "/api/price-audit/defaults",
            get(handlers::get_defaults).put(handlers::update_defaults),
        )
        // ==========================================
        // Waitlist
        // ==========================================
        .route("/api/interest", post(handlers::register_interest));

    if state.server.cors_allow_any {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router = router.layer(cors);
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
