//! GET /: the single-page UI, compiled into the binary.

use std::sync::Arc;

use axum::response::Html;
use axum::routing::get;
use axum::Router;

use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_follows_progress_stream() {
        assert!(INDEX_HTML.contains("EventSource(\"/progress\")"));
        assert!(INDEX_HTML.contains("\"/download\""));
    }
}
