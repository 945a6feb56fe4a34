//! IDE configuration stored under `.compiler-ide/config.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::{Language, RunPolicy};

/// Default config location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".compiler-ide/config.toml";

/// IDE configuration (TOML).
///
/// Missing fields default to the local development setup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IdeConfig {
    /// Language of a new session; the buffer is seeded with its starter snippet.
    pub default_language: Language,

    /// Behaviour of `run` while a run is outstanding.
    pub run_policy: RunPolicy,

    pub endpoint: EndpointConfig,
}

/// Which origin the execution client talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointProfile {
    #[default]
    Local,
    Deployed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EndpointConfig {
    pub profile: EndpointProfile,
    /// Origin of the local development service.
    pub local: String,
    /// Origin of the deployed service.
    pub deployed: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            profile: EndpointProfile::Local,
            local: "http://localhost:5000".to_string(),
            deployed: "https://gameappbackend-i8zv.onrender.com".to_string(),
        }
    }
}

impl Default for IdeConfig {
    fn default() -> Self {
        Self {
            default_language: Language::Java,
            run_policy: RunPolicy::Ignore,
            endpoint: EndpointConfig::default(),
        }
    }
}

impl IdeConfig {
    pub fn validate(&self) -> Result<()> {
        validate_origin("endpoint.local", &self.endpoint.local)?;
        validate_origin("endpoint.deployed", &self.endpoint.deployed)?;
        Ok(())
    }

    /// Origin selected by the active profile, unless `override_origin` is given.
    pub fn resolve_origin<'a>(&'a self, override_origin: Option<&'a str>) -> &'a str {
        if let Some(origin) = override_origin {
            return origin;
        }
        match self.endpoint.profile {
            EndpointProfile::Local => &self.endpoint.local,
            EndpointProfile::Deployed => &self.endpoint.deployed,
        }
    }
}

/// Check that `origin` is an absolute http(s) URL.
pub fn validate_origin(field: &str, origin: &str) -> Result<()> {
    let url = Url::parse(origin).with_context(|| format!("{field}: invalid URL `{origin}`"))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(anyhow!("{field}: unsupported scheme `{other}`")),
    }
    if url.host_str().is_none() {
        return Err(anyhow!("{field}: missing host in `{origin}`"));
    }
    Ok(())
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `IdeConfig::default()`.
pub fn load_config(path: &Path) -> Result<IdeConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config missing, using defaults");
        let cfg = IdeConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: IdeConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &IdeConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
