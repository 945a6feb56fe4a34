//! Client-side orchestration for an online compiler IDE.
//!
//! A session holds the selected language, the source and stdin buffers and the
//! last rendered output. Running the code sends one request to a remote
//! execution service and renders whatever comes back. The crate keeps a strict
//! split:
//!
//! - **[`core`]**: Pure, deterministic logic (the `Idle`/`Running` state
//!   machine, request building, output rendering). No I/O.
//! - **[`io`]**: Side-effecting operations (HTTP execution client, config,
//!   reading buffers from files).
//!
//! [`controller`] wires the two together on a single event-processing context,
//! and [`session`]/[`cli`] implement the terminal front end.

pub mod cli;
pub mod controller;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
