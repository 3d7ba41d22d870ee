// crates/server/src/state.rs
//! Application state for the Axum server.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use vidgrab_core::MediaEngine;

use crate::jobs::stream::DEFAULT_POLL_INTERVAL;
use crate::jobs::JobRunner;
use crate::reveal::{FolderRevealer, OsRevealer};

/// Shared application state accessible from all route handlers.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    /// Single-flight download runner and its status store.
    pub jobs: Arc<JobRunner>,
    /// Where downloads land; also what `/open-folder` reveals.
    pub download_dir: PathBuf,
    /// Sampling period for `/progress` streams.
    pub poll_interval: Duration,
    pub revealer: Arc<dyn FolderRevealer>,
}

impl AppState {
    /// Create a new application state wrapped in an Arc for sharing.
    pub fn new(engine: Arc<dyn MediaEngine>, download_dir: impl Into<PathBuf>) -> Arc<Self> {
        Self::with_options(
            engine,
            download_dir,
            DEFAULT_POLL_INTERVAL,
            Arc::new(OsRevealer),
        )
    }

    /// Like [`AppState::new`] with an explicit poll interval and revealer.
    pub fn with_options(
        engine: Arc<dyn MediaEngine>,
        download_dir: impl Into<PathBuf>,
        poll_interval: Duration,
        revealer: Arc<dyn FolderRevealer>,
    ) -> Arc<Self> {
        let download_dir = download_dir.into();
        Arc::new(Self {
            start_time: Instant::now(),
            jobs: Arc::new(JobRunner::new(engine, download_dir.clone())),
            download_dir,
            poll_interval,
            revealer,
        })
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
