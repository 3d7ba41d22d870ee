//! Download control endpoints.
//!
//! - POST /download: start a job if none is running
//! - GET /status: one-shot status snapshot

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Deserializer, Serialize};
use vidgrab_core::JobStatus;

use crate::error::ApiResult;
use crate::state::AppState;

/// Body of `POST /download`.
#[derive(Debug, Default, Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub url: String,
    /// Height ceiling. The page sends it as a string, scripts often as a number.
    #[serde(default, deserialize_with = "string_or_number")]
    pub quality: Option<String>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub struct OkResponse {
    pub ok: bool,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Quality {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Quality>::deserialize(deserializer)? {
        Some(Quality::Text(s)) => Some(s),
        Some(Quality::Number(n)) => Some(n.to_string()),
        None => None,
    })
}

/// POST /download. Accepted with 202, 400 on an empty url, 409 while busy.
async fn start_download(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DownloadRequest>,
) -> ApiResult<(StatusCode, Json<OkResponse>)> {
    state
        .jobs
        .request_start(&body.url, body.quality.as_deref())?;
    Ok((StatusCode::ACCEPTED, Json(OkResponse { ok: true })))
}

/// GET /status: current job status.
async fn job_status(State(state): State<Arc<AppState>>) -> Json<JobStatus> {
    Json(state.jobs.snapshot())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/download", post(start_download))
        .route("/status", get(job_status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;
    use vidgrab_core::testing::{ScriptHandle, ScriptedEngine};
    use vidgrab_core::Phase;

    use crate::error::ErrorResponse;

    fn app() -> (Router, Arc<AppState>, ScriptHandle) {
        let (engine, script) = ScriptedEngine::new();
        let state = AppState::new(engine, "downloads");
        (router().with_state(Arc::clone(&state)), state, script)
    }

    async fn post_json(app: Router, body: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/download")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    #[test]
    fn test_quality_accepts_string_or_number() {
        let req: DownloadRequest =
            serde_json::from_str(r#"{"url":"u","quality":"720"}"#).unwrap();
        assert_eq!(req.quality.as_deref(), Some("720"));

        let req: DownloadRequest = serde_json::from_str(r#"{"url":"u","quality":1080}"#).unwrap();
        assert_eq!(req.quality.as_deref(), Some("1080"));

        let req: DownloadRequest = serde_json::from_str(r#"{"url":"u","quality":null}"#).unwrap();
        assert_eq!(req.quality, None);

        let req: DownloadRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(req.url, "");
        assert_eq!(req.quality, None);
    }

    #[tokio::test]
    async fn test_start_download_accepted() {
        let (app, state, _script) = app();
        let (status, body) =
            post_json(app, r#"{"url":"https://example/video1","quality":"1080"}"#).await;

        assert_eq!(status, StatusCode::ACCEPTED);
        let body: OkResponse = serde_json::from_slice(&body).unwrap();
        assert!(body.ok);
        assert_eq!(state.jobs.snapshot().phase, Phase::Starting);
    }

    #[tokio::test]
    async fn test_empty_url_is_bad_request() {
        let (app, state, _script) = app();
        let (status, body) = post_json(app, r#"{"url":"  ","quality":"1080"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.error, "No URL provided");
        assert_eq!(state.jobs.snapshot(), JobStatus::idle());
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let (app, state, _script) = app();
        let (status, _) = post_json(app, "{not json").await;

        assert!(status.is_client_error());
        assert_eq!(state.jobs.snapshot(), JobStatus::idle());
    }

    #[tokio::test]
    async fn test_status_returns_snapshot() {
        let (app, state, _script) = app();
        state.jobs.request_start("https://example/a", Some("480")).unwrap();

        let response = app
            .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["phase"], "starting");
        assert_eq!(json["formatLabel"], "MP4");
        assert_eq!(json["percent"], 0.0);
    }
}
