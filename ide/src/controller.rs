//! Controller: user actions in, state transitions and dispatched runs out.
//!
//! All state mutation happens on the caller's task. A run is dispatched as a
//! spawned task that reports back over a channel; [`Controller::next_settlement`]
//! applies those reports one at a time, so settlements never interleave with
//! user edits.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

use crate::core::state::{Settle, UiState};
use crate::core::types::{ExecutionFailure, ExecutionOutcome, Generation, Language, RunPolicy};
use crate::io::client::ExecutionClient;

/// Settled outcome of one dispatched run, tagged with its generation.
#[derive(Debug)]
pub struct Settlement {
    pub generation: Generation,
    pub outcome: ExecutionOutcome,
}

/// What happened to a settlement once it reached the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settled {
    pub generation: Generation,
    pub settle: Settle,
    /// The run ended in an `ExecutionFailure`.
    pub failed: bool,
}

impl Settled {
    pub fn applied(&self) -> bool {
        self.settle == Settle::Applied
    }
}

struct InFlight {
    generation: Generation,
    /// Aborts the client call; its watcher then exits without reporting.
    execution: AbortHandle,
}

pub struct Controller<C> {
    state: UiState,
    policy: RunPolicy,
    client: Arc<C>,
    tx: mpsc::UnboundedSender<Settlement>,
    rx: mpsc::UnboundedReceiver<Settlement>,
    in_flight: Option<InFlight>,
}

impl<C: ExecutionClient + 'static> Controller<C> {
    pub fn new(client: Arc<C>, state: UiState, policy: RunPolicy) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state,
            policy,
            client,
            tx,
            rx,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn policy(&self) -> RunPolicy {
        self.policy
    }

    pub fn select_language(&mut self, language: Language) {
        let previous = self.state.language();
        let discarded = self.state.select_language(language);
        if !discards_user_edits(previous, &discarded) {
            debug!(from = %previous, to = %language, "language changed");
        } else {
            warn!(
                from = %previous,
                to = %language,
                discarded_bytes = discarded.len(),
                "language change discarded the source buffer"
            );
        }
    }

    pub fn edit_code(&mut self, text: impl Into<String>) {
        self.state.edit_code(text);
    }

    pub fn edit_input(&mut self, text: impl Into<String>) {
        self.state.edit_input(text);
    }

    /// Trigger a run.
    ///
    /// Returns the dispatched generation, or `None` when the trigger is
    /// disabled because a run is outstanding. Must be called from within a
    /// tokio runtime.
    pub fn run(&mut self) -> Option<Generation> {
        let Some(dispatch) = self.state.begin_run(self.policy) else {
            debug!(
                latest = %self.state.latest_generation(),
                "run ignored while another run is outstanding"
            );
            return None;
        };
        let generation = dispatch.generation;

        if let Some(previous) = self.in_flight.take() {
            previous.execution.abort();
            info!(
                superseded = %previous.generation,
                generation = %generation,
                "cancelled superseded run"
            );
        }

        info!(
            generation = %generation,
            language = %dispatch.request.language,
            "dispatching run"
        );
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let execution = tokio::spawn(async move { client.execute(dispatch.request).await });
        let abort = execution.abort_handle();
        tokio::spawn(async move {
            let outcome = match execution.await {
                Ok(outcome) => outcome,
                Err(err) if err.is_cancelled() => {
                    debug!(generation = %generation, "run cancelled before it settled");
                    return;
                }
                Err(err) => Err(ExecutionFailure::Transport {
                    message: format!("execution task failed: {err}"),
                }),
            };
            if tx.send(Settlement { generation, outcome }).is_err() {
                debug!(generation = %generation, "controller gone before run settled");
            }
        });
        self.in_flight = Some(InFlight {
            generation,
            execution: abort,
        });
        Some(generation)
    }

    /// Wait for the next settlement and apply it.
    ///
    /// Returns `None` immediately when nothing is running. Cancel safe: the
    /// future may be dropped (e.g. in `tokio::select!`) without losing a
    /// settlement.
    pub async fn next_settlement(&mut self) -> Option<Settled> {
        if !self.state.is_running() {
            return None;
        }
        let settlement = self.rx.recv().await?;
        Some(self.apply(settlement))
    }

    /// Wait until the latest run has settled.
    pub async fn wait_idle(&mut self) {
        while self.next_settlement().await.is_some() {}
    }

    fn apply(&mut self, settlement: Settlement) -> Settled {
        let Settlement {
            generation,
            outcome,
        } = settlement;
        if let Err(failure) = &outcome {
            error!(
                generation = %generation,
                kind = ?failure.kind(),
                error = %failure,
                "execution failed"
            );
        }
        let settle = self.state.settle(generation, &outcome);
        match settle {
            Settle::Applied => {
                if self
                    .in_flight
                    .as_ref()
                    .is_some_and(|run| run.generation == generation)
                {
                    self.in_flight = None;
                }
                debug!(generation = %generation, ok = outcome.is_ok(), "run settled");
            }
            Settle::Stale { latest } => {
                debug!(
                    generation = %generation,
                    latest = %latest,
                    "discarded stale settlement"
                );
            }
        }
        Settled {
            generation,
            settle,
            failed: outcome.is_err(),
        }
    }
}

/// Whether text dropped by a language change was anything but an untouched
/// starter snippet.
fn discards_user_edits(previous: Language, discarded: &str) -> bool {
    !discarded.is_empty() && discarded != previous.starter_snippet()
}

impl<C> Drop for Controller<C> {
    fn drop(&mut self) {
        if let Some(run) = self.in_flight.take() {
            run.execution.abort();
        }
    }
}
