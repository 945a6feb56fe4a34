//! Session state and the `Idle`/`Running` state machine.
//!
//! Every transition is a named method on [`UiState`]. Runs are tagged with a
//! [`Generation`]; a settlement is applied only when its generation is the
//! latest one dispatched, so a slow response to a superseded run can never
//! overwrite the output of a newer one.

use crate::core::render::render_outcome;
use crate::core::request::build_request;
use crate::core::types::{ExecutionOutcome, ExecutionRequest, Generation, Language, RunPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No run outstanding.
    Idle,
    /// One run outstanding; only `generation` may settle it.
    Running { generation: Generation },
}

/// A run that the caller must hand to the execution client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub generation: Generation,
    pub request: ExecutionRequest,
    /// Generation that was still running and is now abandoned (`supersede` only).
    pub superseded: Option<Generation>,
}

/// Result of feeding a settlement into the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    /// Output updated and the machine returned to `Idle`.
    Applied,
    /// The settlement belongs to an older run and was dropped.
    Stale { latest: Generation },
}

/// Mutable state of one editing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    language: Language,
    source_code: String,
    stdin: String,
    last_output: Option<String>,
    phase: Phase,
    latest: Generation,
}

impl UiState {
    /// New session seeded with the language's starter snippet.
    pub fn new(language: Language) -> Self {
        Self {
            language,
            source_code: language.starter_snippet().to_string(),
            stdin: String::new(),
            last_output: None,
            phase: Phase::Idle,
            latest: Generation::default(),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn source_code(&self) -> &str {
        &self.source_code
    }

    pub fn stdin(&self) -> &str {
        &self.stdin
    }

    pub fn last_output(&self) -> Option<&str> {
        self.last_output.as_deref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    /// Generation of the most recently dispatched run (zero before the first run).
    pub fn latest_generation(&self) -> Generation {
        self.latest
    }

    /// Switch language and clear the source buffer.
    ///
    /// Unsaved edits in the previous language are discarded and returned so the
    /// caller can report them. Stdin and the last output are left untouched.
    pub fn select_language(&mut self, language: Language) -> String {
        self.language = language;
        std::mem::take(&mut self.source_code)
    }

    pub fn edit_code(&mut self, text: impl Into<String>) {
        self.source_code = text.into();
    }

    pub fn edit_input(&mut self, text: impl Into<String>) {
        self.stdin = text.into();
    }

    /// `run()`: move to `Running` and produce the request to dispatch.
    ///
    /// Returns `None` when a run is outstanding and `policy` is
    /// [`RunPolicy::Ignore`].
    pub fn begin_run(&mut self, policy: RunPolicy) -> Option<Dispatch> {
        let superseded = match self.phase {
            Phase::Running { generation } => match policy {
                RunPolicy::Ignore => return None,
                RunPolicy::Supersede => Some(generation),
            },
            Phase::Idle => None,
        };
        let generation = self.latest.next();
        self.latest = generation;
        self.last_output = None;
        self.phase = Phase::Running { generation };
        Some(Dispatch {
            generation,
            request: build_request(self),
            superseded,
        })
    }

    /// `onSuccess`/`onFailure`: apply a settled outcome if it belongs to the
    /// latest run.
    pub fn settle(&mut self, generation: Generation, outcome: &ExecutionOutcome) -> Settle {
        match self.phase {
            Phase::Running { generation: current } if current == generation => {
                self.last_output = Some(render_outcome(outcome));
                self.phase = Phase::Idle;
                Settle::Applied
            }
            _ => Settle::Stale {
                latest: self.latest,
            },
        }
    }
}
