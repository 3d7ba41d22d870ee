// crates/core/src/error.rs
use thiserror::Error;

/// Failures of the external download/transcode engine.
///
/// The `Display` text is what ends up in the job's `errorMessage`, so it is
/// written for the person watching the progress bar.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while talking to {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine reported an error of its own (e.g. an unavailable video).
    #[error("{0}")]
    Reported(String),

    #[error("{program} exited with {status}")]
    Exited { program: String, status: String },
}

/// A quality hint that is not a positive height.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QualityError {
    #[error("Unsupported quality: {0:?}")]
    Unsupported(String),
}
