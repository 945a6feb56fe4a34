//! Loading source and stdin buffers for the terminal front end.
//!
//! The editor widget is outside this crate; from the controller's point of view
//! it is a string buffer. Here the buffer's contents come from a file, or from
//! the process stdin when the path is `-`.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Path value that means "read from stdin".
pub const STDIN_PATH: &str = "-";

/// Read a whole buffer from `path` (or stdin for `-`).
pub async fn read_buffer(path: &Path) -> Result<String> {
    if path.as_os_str() == STDIN_PATH {
        let mut contents = String::new();
        tokio::io::stdin()
            .read_to_string(&mut contents)
            .await
            .context("read buffer from stdin")?;
        debug!(bytes = contents.len(), "buffer loaded from stdin");
        return Ok(contents);
    }
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    debug!(path = %path.display(), bytes = contents.len(), "buffer loaded");
    Ok(contents)
}
