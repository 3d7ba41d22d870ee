// crates/server/src/jobs/runner.rs
//! Job runner: accepts at most one download at a time and drives the engine.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use vidgrab_core::{
    normalize, select_format, FetchRequest, FormatSelection, JobStatus, MediaEngine,
    QualityError, StatusUpdate, DEFAULT_QUALITY,
};

use super::state::JobStore;
use super::types::StartError;

/// Owns the job lifecycle.
///
/// `request_start` does the single-flight check and the reset synchronously,
/// then spawns the engine on a tokio task. From there on every outcome,
/// including a panicking engine, ends up in the store as `Done` or `Failed`.
pub struct JobRunner {
    store: Arc<JobStore>,
    engine: Arc<dyn MediaEngine>,
    output_dir: PathBuf,
}

impl JobRunner {
    pub fn new(engine: Arc<dyn MediaEngine>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: Arc::new(JobStore::new()),
            engine,
            output_dir: output_dir.into(),
        }
    }

    /// The shared status record (read side for handlers and streams).
    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    pub fn snapshot(&self) -> JobStatus {
        self.store.snapshot()
    }

    /// Start a download of `target` if no job is active.
    ///
    /// `quality` is a height ceiling such as `"1080"`; `None` or blank means
    /// [`DEFAULT_QUALITY`]. An unusable quality is not a synchronous error:
    /// the job is accepted and fails right away, like any other engine-side
    /// problem. Must be called from within a tokio runtime.
    pub fn request_start(&self, target: &str, quality: Option<&str>) -> Result<(), StartError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(StartError::MissingTarget);
        }

        let quality = quality
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .unwrap_or(DEFAULT_QUALITY);
        let selection = select_format(quality);
        let format_label = selection
            .as_ref()
            .map(|s| s.container.label())
            .unwrap_or_default();

        self.store.begin(format_label).inspect_err(|_| {
            tracing::info!(target = %target, "download rejected: another job is running");
        })?;

        tracing::info!(
            target = %target,
            quality = %quality,
            format = %format_label,
            engine = self.engine.name(),
            "download accepted"
        );

        tokio::spawn(run_job(
            Arc::clone(&self.store),
            Arc::clone(&self.engine),
            target.to_string(),
            selection,
            self.output_dir.clone(),
        ));
        Ok(())
    }
}

/// Body of the background task. Never returns an error: everything is
/// recorded in the store, and the worker slot is released exactly once, by
/// the final `finish`.
async fn run_job(
    store: Arc<JobStore>,
    engine: Arc<dyn MediaEngine>,
    target: String,
    selection: Result<FormatSelection, QualityError>,
    output_dir: PathBuf,
) {
    let started = std::time::Instant::now();
    let selection = match selection {
        Ok(selection) => selection,
        Err(e) => {
            tracing::warn!(target = %target, error = %e, "download failed before start");
            store.finish(StatusUpdate::failed(e.to_string()));
            return;
        }
    };

    let request = FetchRequest::new(target.clone(), &selection, output_dir);
    let (tx, mut rx) = mpsc::unbounded_channel();

    // Normalizer sink. Ends once the engine drops its sender, which happens
    // when `fetch` returns or unwinds.
    let sink_store = Arc::clone(&store);
    let forwarder = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Some(update) = normalize(&event) {
                sink_store.apply(update);
            }
        }
    });

    // Separate task so a panicking engine surfaces as a JoinError here.
    let fetch = tokio::spawn(async move { engine.fetch(request, tx).await });
    let outcome = fetch.await;

    // Drain outstanding events before the final status so it lands last.
    if let Err(e) = forwarder.await {
        tracing::error!(error = %e, "progress forwarder task failed");
    }

    let final_update = match outcome {
        Ok(Ok(())) => StatusUpdate::Done,
        Ok(Err(e)) => {
            tracing::warn!(target = %target, error = %e, "download failed");
            StatusUpdate::failed(e.to_string())
        }
        Err(e) => {
            tracing::error!(target = %target, error = %e, "download task crashed");
            StatusUpdate::failed(format!("Download task crashed: {e}"))
        }
    };
    store.finish(final_update);
    tracing::info!(
        target = %target,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "download worker finished"
    );
}
