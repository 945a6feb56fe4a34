//! Test-only execution client with scripted, optionally gated, responses.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::core::types::{ExecutionFailure, ExecutionOutcome, ExecutionRequest};
use crate::io::client::ExecutionClient;

enum Scripted {
    Ready(ExecutionOutcome),
    Gated(oneshot::Receiver<ExecutionOutcome>),
}

/// Execution client that answers from a script keyed by source code.
///
/// Responses are keyed by the request's source rather than call order, so
/// tests stay deterministic no matter how spawned runs are scheduled. Every
/// request is recorded before its response is awaited.
#[derive(Default)]
pub struct ScriptedClient {
    script: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<ExecutionRequest>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an immediate response for the next request with `source_code`.
    pub fn respond(&self, source_code: &str, outcome: ExecutionOutcome) {
        self.push(source_code, Scripted::Ready(outcome));
    }

    /// Queue a response that is held until the returned sender fires.
    pub fn respond_gated(&self, source_code: &str) -> oneshot::Sender<ExecutionOutcome> {
        let (tx, rx) = oneshot::channel();
        self.push(source_code, Scripted::Gated(rx));
        tx
    }

    /// Requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<ExecutionRequest> {
        lock(&self.requests).clone()
    }

    fn push(&self, source_code: &str, scripted: Scripted) {
        lock(&self.script)
            .entry(source_code.to_string())
            .or_default()
            .push_back(scripted);
    }
}

#[async_trait]
impl ExecutionClient for ScriptedClient {
    async fn execute(&self, request: ExecutionRequest) -> ExecutionOutcome {
        let next = lock(&self.script)
            .get_mut(&request.source_code)
            .and_then(VecDeque::pop_front);
        lock(&self.requests).push(request);
        match next {
            Some(Scripted::Ready(outcome)) => outcome,
            Some(Scripted::Gated(rx)) => rx.await.unwrap_or_else(|_| {
                Err(ExecutionFailure::Transport {
                    message: "scripted gate dropped".to_string(),
                })
            }),
            None => Err(ExecutionFailure::Transport {
                message: "no scripted response".to_string(),
            }),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
