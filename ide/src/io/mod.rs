//! I/O helpers: the remote execution client, configuration and buffer loading.

pub mod buffer;
pub mod client;
pub mod config;
