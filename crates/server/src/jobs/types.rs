// crates/server/src/jobs/types.rs
//! Types for the download job system.

use thiserror::Error;

/// Why a start request was turned away. Both cases leave the current status
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("No URL provided")]
    MissingTarget,

    #[error("A download is already running")]
    Busy,
}
