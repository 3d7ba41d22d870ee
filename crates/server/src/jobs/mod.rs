// crates/server/src/jobs/mod.rs
//! Single-flight download job system.
//!
//! Provides:
//! - `JobStore`: the one shared status record, behind a lock
//! - `JobRunner`: accepts at most one job at a time and drives the engine
//! - `subscribe`: change-driven snapshot stream for SSE
//! - `StartError`: synchronous start rejections

pub mod runner;
pub mod state;
pub mod stream;
pub mod types;

pub use runner::JobRunner;
pub use state::JobStore;
pub use stream::subscribe;
pub use types::StartError;
