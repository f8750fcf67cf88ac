//! Client configuration stored under `<state_dir>/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

pub const DEFAULT_STATE_DIR: &str = ".vetdesk";

/// Client configuration (TOML).
///
/// Missing fields default to a backend on localhost.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the clinic backend, e.g. `http://localhost:8080`.
    pub base_url: String,

    /// Per-request timeout in seconds. `0` leaves requests unbounded.
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 0,
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(anyhow!("base_url must be non-empty"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(anyhow!("base_url must start with http:// or https://"));
        }
        Ok(())
    }
}

/// Resolved paths under the state directory.
#[derive(Debug, Clone)]
pub struct StatePaths {
    pub config_path: PathBuf,
    pub session_dir: PathBuf,
}

impl StatePaths {
    pub fn new(root: &Path) -> Self {
        Self {
            config_path: root.join("config.toml"),
            session_dir: root.join("session"),
        }
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ClientConfig::default()`.
pub fn load_config(path: &Path) -> Result<ClientConfig> {
    if !path.exists() {
        let cfg = ClientConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ClientConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &ClientConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

/// Write `contents` next to `path` and rename it into place.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let mut tmp_name = path
        .file_name()
        .with_context(|| format!("path missing file name {}", path.display()))?
        .to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = parent.join(tmp_name);
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}
