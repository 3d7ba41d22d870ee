// crates/core/src/status.rs
//! Canonical status record for the single download job.
//!
//! [`JobStatus`] is what the SSE stream serializes. [`StatusUpdate`] is what
//! the normalizer and the runner produce; [`JobStatus::apply`] folds an update
//! into the record while keeping the lifecycle invariants:
//!
//! - phases only move forward within a run,
//! - `percent` never decreases and stays in `[0, 100]`,
//! - the record is frozen once it reaches `Done` or `Failed`,
//! - `error_message` is non-empty exactly when the phase is `Failed`.

use serde::{Deserialize, Serialize};

/// ETA label shown while the engine remuxes video and audio.
pub const MERGING_LABEL: &str = "Merging…";

/// ETA label shown once the job has completed.
pub const COMPLETE_LABEL: &str = "Complete!";

/// Message recorded when a failure carries no description of its own.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Coarse stage of the job. Variant order is lifecycle order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Starting,
    Downloading,
    Merging,
    Done,
    Failed,
}

impl Phase {
    /// A job in this phase blocks new starts.
    pub fn is_active(self) -> bool {
        matches!(self, Phase::Starting | Phase::Downloading | Phase::Merging)
    }

    /// No further updates are accepted until the next job starts.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Starting => "starting",
            Phase::Downloading => "downloading",
            Phase::Merging => "merging",
            Phase::Done => "done",
            Phase::Failed => "failed",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the current (or most recent) job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub phase: Phase,
    pub percent: f64,
    pub speed_label: String,
    pub eta_label: String,
    pub current_file_name: String,
    pub error_message: String,
    /// Container picked by the quality policy ("MP4" / "WebM").
    pub format_label: String,
}

impl JobStatus {
    /// The record before any job has been accepted.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Fresh record for a job that has just been accepted.
    pub fn starting(format_label: impl Into<String>) -> Self {
        Self {
            phase: Phase::Starting,
            format_label: format_label.into(),
            ..Self::default()
        }
    }

    /// Fold `update` into the record. Returns `false` when the update was
    /// dropped because it would move the lifecycle backward or the record is
    /// already terminal.
    pub fn apply(&mut self, update: StatusUpdate) -> bool {
        if self.phase.is_terminal() || update.phase() < self.phase {
            return false;
        }

        match update {
            StatusUpdate::Downloading {
                percent,
                speed_label,
                eta_label,
                file_name,
            } => {
                self.phase = Phase::Downloading;
                self.percent = self.percent.max(clamp_percent(percent));
                self.speed_label = speed_label;
                self.eta_label = eta_label;
                self.current_file_name = file_name;
            }
            StatusUpdate::Merging { file_name } => {
                self.phase = Phase::Merging;
                self.percent = self.percent.max(99.0);
                self.speed_label.clear();
                self.eta_label = MERGING_LABEL.to_string();
                if !file_name.is_empty() {
                    self.current_file_name = file_name;
                }
            }
            StatusUpdate::Done => {
                self.phase = Phase::Done;
                self.percent = 100.0;
                self.eta_label = COMPLETE_LABEL.to_string();
            }
            StatusUpdate::Failed { message } => {
                self.phase = Phase::Failed;
                self.error_message = if message.trim().is_empty() {
                    UNKNOWN_ERROR.to_string()
                } else {
                    message
                };
            }
        }
        true
    }
}

/// A normalized change to the job status. Each variant fully owns the fields
/// it sets; fields it does not mention are left as they are.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusUpdate {
    Downloading {
        percent: f64,
        speed_label: String,
        eta_label: String,
        file_name: String,
    },
    /// Transfer finished; the engine is remuxing.
    Merging { file_name: String },
    /// The engine returned successfully.
    Done,
    Failed { message: String },
}

impl StatusUpdate {
    /// Phase the record will be in after this update.
    pub fn phase(&self) -> Phase {
        match self {
            StatusUpdate::Downloading { .. } => Phase::Downloading,
            StatusUpdate::Merging { .. } => Phase::Merging,
            StatusUpdate::Done => Phase::Done,
            StatusUpdate::Failed { .. } => Phase::Failed,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        StatusUpdate::Failed {
            message: message.into(),
        }
    }
}

/// Coerce into `[0, 100]`; NaN becomes 0.
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}
