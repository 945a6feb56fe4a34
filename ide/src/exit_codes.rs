//! Stable exit codes for `compiler-ide` commands.

/// Command succeeded (for `run`: the service returned a result).
pub const OK: i32 = 0;
/// Invalid usage, config or unreadable input files.
pub const INVALID: i32 = 1;
/// `compiler-ide run` reached the service but the run failed (error sentinel shown).
pub const RUN_FAILED: i32 = 2;
