//! HTTP route handlers for the vidgrab server.

pub mod download;
pub mod folder;
pub mod health;
pub mod page;
pub mod progress;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Create the combined router.
///
/// Routes:
/// - GET  / - The single-page UI
/// - POST /download - Start a download if none is running
/// - GET  /progress - SSE stream of job status snapshots
/// - GET  /status - One-shot job status snapshot
/// - GET  /open-folder - Reveal the download directory
/// - GET  /health - Health check
pub fn app_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(page::router())
        .merge(download::router())
        .merge(progress::router())
        .merge(folder::router())
        .merge(health::router())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use vidgrab_core::testing::ScriptedEngine;

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let (engine, _script) = ScriptedEngine::new();
        let app = app_routes(AppState::new(engine, "downloads"));

        let response = app
            .oneshot(Request::builder().uri("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
