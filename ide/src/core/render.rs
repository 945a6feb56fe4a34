//! Text shown to the user for results, failures and the run trigger.

use crate::core::state::UiState;
use crate::core::types::{ExecutionOutcome, RunPolicy};

/// Shown for a successful run that printed nothing.
pub const NO_OUTPUT: &str = "No output";
/// Shown for any failed run. Raw error details go to the diagnostic log only.
pub const ERROR_SENTINEL: &str = "⚠️ Error running code! Check console for details.";
/// Output area while a run is outstanding.
pub const RUNNING_INDICATOR: &str = "Running...";
/// Output area before the first run.
pub const OUTPUT_PLACEHOLDER: &str = "Output will appear here...";
/// Run trigger label while idle.
pub const RUN_LABEL: &str = "Compile & Run";

/// Render a settled outcome.
pub fn render_outcome(outcome: &ExecutionOutcome) -> String {
    match outcome {
        Ok(result) if result.output.is_empty() => NO_OUTPUT.to_string(),
        Ok(result) => result.output.clone(),
        Err(_) => ERROR_SENTINEL.to_string(),
    }
}

/// Text of the output area for the current state.
pub fn output_area(state: &UiState) -> &str {
    if state.is_running() {
        return RUNNING_INDICATOR;
    }
    state.last_output().unwrap_or(OUTPUT_PLACEHOLDER)
}

/// Label and enablement of the run trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTrigger {
    pub label: &'static str,
    pub enabled: bool,
}

pub fn run_trigger(state: &UiState, policy: RunPolicy) -> RunTrigger {
    if !state.is_running() {
        return RunTrigger {
            label: RUN_LABEL,
            enabled: true,
        };
    }
    RunTrigger {
        label: RUNNING_INDICATOR,
        enabled: policy == RunPolicy::Supersede,
    }
}
