// crates/core/src/engine.rs
//! MediaEngine trait: the seam between the job runner and whatever actually
//! fetches and transcodes media.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::EngineError;
use crate::format::FormatSelection;
use crate::progress::RawProgressEvent;

/// Where an engine pushes its progress events. Unbounded so a slow consumer
/// never stalls the engine's stdout reader.
pub type EventSink = mpsc::UnboundedSender<RawProgressEvent>;

/// Output naming used when the caller does not override it.
pub const DEFAULT_OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Everything the engine needs for one download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub target: String,
    pub format_selector: String,
    pub merge_format: String,
    pub output_dir: PathBuf,
    pub output_template: String,
}

impl FetchRequest {
    pub fn new(
        target: impl Into<String>,
        selection: &FormatSelection,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            target: target.into(),
            format_selector: selection.selector.clone(),
            merge_format: selection.container.merge_format().to_string(),
            output_dir: output_dir.into(),
            output_template: DEFAULT_OUTPUT_TEMPLATE.to_string(),
        }
    }

    /// Directory joined with the naming template.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_template)
    }
}

/// An external download/transcode engine.
///
/// Implementations:
/// - `YtDlpEngine`: spawns the `yt-dlp` binary
/// - `testing::ScriptedEngine`: replays events fed by a test
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Run one download to completion, sending progress events to `events`
    /// as they happen. May fail before emitting anything.
    async fn fetch(&self, request: FetchRequest, events: EventSink) -> Result<(), EngineError>;

    /// Engine name for logging.
    fn name(&self) -> &str;
}
