//! Axum router configuration with middleware.
//!
//! Chat pages live at the root, the JSON API under `/api/v1/`.
//! Middleware: CORS, tracing.

use axum::Json;
use axum::Router;
use axum::routing::{get, post};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use heavylifter_core::sql::SqlDatabase;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router<D: SqlDatabase + 'static>(state: AppState<D>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/sessions/{id}", get(handlers::api::get_session::<D>))
        .route("/ask", post(handlers::api::ask::<D>));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .route("/", get(handlers::pages::home::<D>))
        .route("/{page}", get(handlers::pages::start_session::<D>))
        .route(
            "/{page}/{id}",
            get(handlers::pages::show_session::<D>).post(handlers::pages::submit_prompt::<D>),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint (no state needed).
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
