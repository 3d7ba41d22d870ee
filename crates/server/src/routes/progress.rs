//! SSE progress endpoint.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::http::header::{self, HeaderName};
use axum::response::sse::{Event, Sse};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tokio_stream::StreamExt;

use crate::jobs::subscribe;
use crate::state::AppState;

const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

/// GET /progress: one `data:` frame per status change, JSON-encoded.
///
/// The stream ends after a `done` or `failed` snapshot. Each connection has
/// its own subscription, so a client that reconnects after the job finished
/// gets the final status once and then the end of the stream.
pub async fn progress(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshots = subscribe(Arc::clone(state.jobs.store()), state.poll_interval);
    let events = snapshots.map(|snapshot| {
        let json = serde_json::to_string(&snapshot).unwrap_or_default();
        Ok::<_, Infallible>(Event::default().data(json))
    });

    (
        [
            (header::CACHE_CONTROL, "no-cache"),
            (X_ACCEL_BUFFERING, "no"),
        ],
        Sse::new(events),
    )
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/progress", get(progress))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::time::Duration;
    use tower::ServiceExt;
    use vidgrab_core::testing::ScriptedEngine;
    use vidgrab_core::{JobStatus, Phase, StatusUpdate};

    use crate::reveal::OsRevealer;

    fn data_frames(body: &str) -> Vec<JobStatus> {
        body.lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .map(|json| serde_json::from_str(json.trim()).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_progress_after_completion_sends_terminal_once() {
        let (engine, _script) = ScriptedEngine::new();
        let state = AppState::with_options(
            engine,
            "downloads",
            Duration::from_millis(10),
            Arc::new(OsRevealer),
        );
        state.jobs.store().begin("MP4").unwrap();
        state.jobs.store().apply(StatusUpdate::Done);

        let app = router().with_state(Arc::clone(&state));
        let response = app
            .oneshot(Request::builder().uri("/progress").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/event-stream");
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
        assert_eq!(headers["x-accel-buffering"], "no");

        // The stream is finite, so the whole body can be collected.
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let frames = data_frames(&String::from_utf8(body.to_vec()).unwrap());
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].phase, Phase::Done);
        assert_eq!(frames[0].eta_label, "Complete!");
    }
}
