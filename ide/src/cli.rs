//! CLI command implementations.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncWriteExt, BufReader};
use tracing::{debug, info};

use crate::controller::Controller;
use crate::core::render::output_area;
use crate::core::state::UiState;
use crate::core::types::Language;
use crate::exit_codes;
use crate::io::buffer::read_buffer;
use crate::io::client::HttpExecutionClient;
use crate::io::config::{IdeConfig, load_config, write_config};
use crate::session::{language_table, run_session};

/// Where the stdin buffer of a one-shot run comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource<'a> {
    Empty,
    Text(&'a str),
    File(&'a Path),
}

/// Parameters for `compiler-ide run`.
#[derive(Debug, Clone)]
pub struct RunOptions<'a> {
    pub config_path: &'a Path,
    pub endpoint: Option<&'a str>,
    pub language: Language,
    /// Source file; `None` runs the language's empty buffer.
    pub source: Option<&'a Path>,
    pub input: InputSource<'a>,
}

/// One-shot run: select language, load buffers, run once, print the output.
///
/// Returns the process exit code.
pub async fn run_once(options: &RunOptions<'_>) -> Result<i32> {
    let cfg = load_config(options.config_path)?;
    let client = http_client(&cfg, options.endpoint)?;

    let mut controller = Controller::new(
        Arc::new(client),
        UiState::new(cfg.default_language),
        cfg.run_policy,
    );
    controller.select_language(options.language);
    if let Some(path) = options.source {
        controller.edit_code(read_buffer(path).await.context("load source")?);
    }
    match options.input {
        InputSource::Empty => {}
        InputSource::Text(text) => controller.edit_input(text),
        InputSource::File(path) => {
            controller.edit_input(read_buffer(path).await.context("load input")?);
        }
    }

    controller.run().context("run was not dispatched")?;
    let mut failed = false;
    while let Some(settled) = controller.next_settlement().await {
        if settled.applied() {
            failed = settled.failed;
        }
    }

    let rendered = output_area(controller.state());
    let mut stdout = tokio::io::stdout();
    stdout.write_all(rendered.as_bytes()).await?;
    if !rendered.ends_with('\n') {
        stdout.write_all(b"\n").await?;
    }
    stdout.flush().await?;

    if failed {
        return Ok(exit_codes::RUN_FAILED);
    }
    Ok(exit_codes::OK)
}

/// Interactive session on the process stdin/stdout.
pub async fn run_interactive(config_path: &Path, endpoint: Option<&str>) -> Result<()> {
    let cfg = load_config(config_path)?;
    let client = http_client(&cfg, endpoint)?;
    let mut controller = Controller::new(
        Arc::new(client),
        UiState::new(cfg.default_language),
        cfg.run_policy,
    );
    let mut stdout = tokio::io::stdout();
    run_session(
        &mut controller,
        BufReader::new(tokio::io::stdin()),
        &mut stdout,
    )
    .await
}

/// Print the supported languages.
pub fn list_languages() {
    print!("{}", language_table());
}

/// Write the default config. Existing files are kept unless `force` is set.
pub fn init_config(config_path: &Path, force: bool) -> Result<()> {
    if !force && config_path.exists() {
        info!(path = %config_path.display(), "config exists, leaving it untouched");
        return Ok(());
    }
    write_config(config_path, &IdeConfig::default())
        .with_context(|| format!("write {}", config_path.display()))?;
    println!("wrote {}", config_path.display());
    Ok(())
}

fn http_client(cfg: &IdeConfig, endpoint: Option<&str>) -> Result<HttpExecutionClient> {
    let origin = cfg.resolve_origin(endpoint);
    let client = HttpExecutionClient::new(origin)
        .with_context(|| format!("configure execution endpoint `{origin}`"))?;
    debug!(url = %client.url(), "execution client ready");
    Ok(client)
}
