//! Deterministic, pure logic for the IDE session.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! state and return deterministic outputs suitable for tests.

pub mod render;
pub mod request;
pub mod state;
pub mod types;
