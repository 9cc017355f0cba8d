//! API layer -- axum routes, handlers, and middleware.

mod error;
mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use self::state::AppState;

/// Build the application router with all API routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/api/health", get(routes::health))
        .route("/api/test/ping", get(routes::ping))
        .route("/api/test/download", post(routes::download))
        // Upload bodies are deliberately unbounded server-side; the transport
        // layer is the only cap.
        .route(
            "/api/test/upload",
            post(routes::upload).layer(DefaultBodyLimit::disable()),
        )
        .route(
            "/api/results/",
            post(routes::create_result).get(routes::list_results),
        )
        .route(
            "/api/results/{id}",
            get(routes::get_result).delete(routes::delete_result),
        )
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn fallback() -> (axum::http::StatusCode, &'static str) {
    (axum::http::StatusCode::NOT_FOUND, "not found")
}
