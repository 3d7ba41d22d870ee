//! GET /open-folder: reveal the download directory in the OS file manager.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::{ApiError, ApiResult};
use crate::routes::download::OkResponse;
use crate::state::AppState;

async fn open_folder(State(state): State<Arc<AppState>>) -> ApiResult<Json<OkResponse>> {
    let dir = state.download_dir.clone();
    let revealer = Arc::clone(&state.revealer);

    // Launching a file manager can block briefly.
    tokio::task::spawn_blocking(move || {
        std::fs::create_dir_all(&dir)?;
        revealer.reveal(&dir)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("reveal task failed: {e}")))?
    .map_err(|e| ApiError::Reveal(e.to_string()))?;

    Ok(Json(OkResponse { ok: true }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/open-folder", get(open_folder))
}
