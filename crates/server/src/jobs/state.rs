// crates/server/src/jobs/state.rs
//! Process-wide status record for the single download job.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use vidgrab_core::{JobStatus, StatusUpdate};

use super::types::StartError;

/// Status plus whether a worker task still owns it. The two change together
/// under one lock: a job can report `Failed` while its engine is still running.
#[derive(Debug, Default)]
struct Slot {
    status: JobStatus,
    worker_running: bool,
}

/// Owner of the one [`JobStatus`].
///
/// Every read and write goes through these methods, each of which holds the
/// lock for the whole operation, so readers never see a half-applied update
/// and the single-flight check cannot race with a reset.
pub struct JobStore {
    slot: RwLock<Slot>,
}

impl JobStore {
    /// Create a store holding an idle record.
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(Slot::default()),
        }
    }

    /// Copy of the current record.
    pub fn snapshot(&self) -> JobStatus {
        self.read().status.clone()
    }

    /// Whether a worker has been admitted by [`begin`](Self::begin) and not
    /// yet released by [`finish`](Self::finish).
    pub fn is_busy(&self) -> bool {
        self.read().worker_running
    }

    /// Replace the record with an idle one, whatever state it is in. Does not
    /// release a running worker.
    pub fn reset(&self) {
        self.write().status = JobStatus::idle();
    }

    /// Accept a new job: fail with [`StartError::Busy`] while a worker is
    /// running or the record is active, otherwise claim the worker slot and
    /// replace the record with a fresh `Starting` one.
    pub fn begin(&self, format_label: &str) -> Result<(), StartError> {
        let mut slot = self.write();
        if slot.worker_running || slot.status.phase.is_active() {
            return Err(StartError::Busy);
        }
        slot.worker_running = true;
        slot.status = JobStatus::starting(format_label);
        Ok(())
    }

    /// Fold a normalized update into the record. Returns whether it was kept.
    pub fn apply(&self, update: StatusUpdate) -> bool {
        let mut slot = self.write();
        apply_logged(&mut slot.status, update)
    }

    /// Record the worker's final outcome and release the slot in one step, so
    /// the next job cannot start until this one's result is in place.
    pub fn finish(&self, update: StatusUpdate) -> bool {
        let mut slot = self.write();
        let applied = apply_logged(&mut slot.status, update);
        slot.worker_running = false;
        applied
    }

    fn read(&self) -> RwLockReadGuard<'_, Slot> {
        self.slot.read().unwrap_or_else(|poisoned| {
            tracing::error!("RwLock poisoned reading job status; recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slot> {
        self.slot.write().unwrap_or_else(|poisoned| {
            tracing::error!("RwLock poisoned writing job status; recovering");
            poisoned.into_inner()
        })
    }
}

fn apply_logged(status: &mut JobStatus, update: StatusUpdate) -> bool {
    let phase_before = status.phase;
    let next = update.phase();
    let applied = status.apply(update);
    if !applied {
        tracing::debug!(
            current = %phase_before,
            update = %next,
            "dropping status update that would move the job backward"
        );
    }
    applied
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}
