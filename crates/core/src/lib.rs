// crates/core/src/lib.rs
//! Core types for vidgrab: the canonical job status, the progress normalizer,
//! the quality → format policy, and the media engine that does the actual work.

pub mod engine;
pub mod error;
pub mod format;
pub mod progress;
pub mod status;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod ytdlp;

pub use engine::{EventSink, FetchRequest, MediaEngine};
pub use error::{EngineError, QualityError};
pub use format::{select_format, Container, FormatSelection, DEFAULT_QUALITY};
pub use progress::{normalize, RawProgressEvent};
pub use status::{JobStatus, Phase, StatusUpdate};
pub use ytdlp::YtDlpEngine;
