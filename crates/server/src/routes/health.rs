//! GET /health: liveness plus whether a download worker is running.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    /// A worker holds the single download slot.
    pub busy: bool,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
        busy: state.jobs.store().is_busy(),
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use vidgrab_core::testing::ScriptedEngine;

    async fn fetch(state: Arc<AppState>) -> HealthResponse {
        let response = router()
            .with_state(state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_worker_slot() {
        let (engine, _script) = ScriptedEngine::new();
        let state = AppState::new(engine, "downloads");

        let idle = fetch(Arc::clone(&state)).await;
        assert_eq!(idle.status, "ok");
        assert_eq!(idle.version, env!("CARGO_PKG_VERSION"));
        assert!(!idle.busy);

        state.jobs.store().begin("MP4").unwrap();
        assert!(fetch(state).await.busy);
    }
}
