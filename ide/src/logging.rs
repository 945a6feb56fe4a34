//! Diagnostic tracing for the IDE client.
//!
//! Everything logged here goes to stderr; stdout only ever carries rendered
//! output. The controller logs each dispatched run and its settlement with the
//! run generation, stale settlements it drops and runs cancelled by a newer
//! one. Execution failures are logged at `error` with their full details, and
//! a language change that throws away edited source is logged at `warn`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG` env var. Defaults to `warn` if unset.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=compiler_ide=debug compiler-ide session
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
