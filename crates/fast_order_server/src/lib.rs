//! Fast Order Server - HTTP front end for the order generator

pub mod handlers;
pub mod types;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use handlers::AppState;

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    // The browser front end may be served from a different origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/generate-order", post(handlers::generate_order))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
