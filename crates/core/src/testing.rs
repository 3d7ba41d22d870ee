// crates/core/src/testing.rs
//! Scripted engine for tests: the test decides, step by step, what the
//! "download" emits and how it ends.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex as AsyncMutex};

use crate::engine::{EventSink, FetchRequest, MediaEngine};
use crate::error::EngineError;
use crate::progress::RawProgressEvent;

/// One scripted action.
#[derive(Debug, Clone)]
pub enum Step {
    Emit(RawProgressEvent),
    Succeed,
    Fail(String),
    Panic(String),
}

/// Engine whose `fetch` replays steps pushed through a [`ScriptHandle`].
///
/// Each `fetch` consumes steps until `Succeed`, `Fail` or `Panic`, so one
/// script can drive several jobs in sequence. A dropped handle ends the
/// current fetch successfully.
pub struct ScriptedEngine {
    steps: AsyncMutex<mpsc::UnboundedReceiver<Step>>,
    requests: Mutex<Vec<FetchRequest>>,
}

/// Test-side handle feeding a [`ScriptedEngine`].
#[derive(Clone)]
pub struct ScriptHandle {
    tx: mpsc::UnboundedSender<Step>,
}

impl ScriptedEngine {
    pub fn new() -> (Arc<Self>, ScriptHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = Arc::new(Self {
            steps: AsyncMutex::new(rx),
            requests: Mutex::new(Vec::new()),
        });
        (engine, ScriptHandle { tx })
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl ScriptHandle {
    pub fn emit(&self, event: RawProgressEvent) {
        let _ = self.tx.send(Step::Emit(event));
    }

    pub fn succeed(&self) {
        let _ = self.tx.send(Step::Succeed);
    }

    pub fn fail(&self, message: impl Into<String>) {
        let _ = self.tx.send(Step::Fail(message.into()));
    }

    pub fn panic(&self, message: impl Into<String>) {
        let _ = self.tx.send(Step::Panic(message.into()));
    }
}

#[async_trait]
impl MediaEngine for ScriptedEngine {
    async fn fetch(&self, request: FetchRequest, events: EventSink) -> Result<(), EngineError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let mut steps = self.steps.lock().await;
        while let Some(step) = steps.recv().await {
            match step {
                Step::Emit(event) => {
                    let _ = events.send(event);
                }
                Step::Succeed => return Ok(()),
                Step::Fail(message) => return Err(EngineError::Reported(message)),
                Step::Panic(message) => panic!("{message}"),
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
