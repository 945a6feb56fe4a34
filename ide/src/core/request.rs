//! Maps the current session state to an execution request.

use crate::core::state::UiState;
use crate::core::types::ExecutionRequest;

/// Build the request payload for the current buffers.
///
/// No trimming or validation: an empty source is sent as-is and the service
/// decides what to do with it.
pub fn build_request(state: &UiState) -> ExecutionRequest {
    ExecutionRequest {
        language: state.language(),
        source_code: state.source_code().to_string(),
        stdin: state.stdin().to_string(),
    }
}
