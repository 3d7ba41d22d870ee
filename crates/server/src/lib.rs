// crates/server/src/lib.rs
//! vidgrab server library.
//!
//! Axum front-end over a single-flight download runner: start a job, watch it
//! over SSE, reveal the output folder.

pub mod config;
pub mod error;
pub mod jobs;
pub mod reveal;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::*;
pub use routes::app_routes;
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

/// Create the Axum application with all routes and request tracing.
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(app_routes(state))
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// Integration Tests
// ============================================================================
