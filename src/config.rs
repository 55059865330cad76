use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_combo_marker() -> String {
    "??".to_string()
}

fn default_charset() -> String {
    "utf-8".to_string()
}

fn default_poll_interval_ms() -> u64 {
    30
}

fn default_load_timeout_secs() -> u64 {
    120
}

/// Static configuration for the fragment loader, supplied once at
/// initialization. Loaded from `~/.config/cfl/config.toml` when the
/// embedder does not construct it directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboConfig {
    /// Endpoint prefixes that qualify an endpoint as combo-capable.
    /// Substring match, first match wins; empty list disables combo mode.
    #[serde(default)]
    pub allow_list: Vec<String>,
    /// Separator between path segments inside a combined request.
    #[serde(default = "default_delimiter")]
    pub combo_delimiter: String,
    /// Marker appended to the endpoint before the joined path segments.
    #[serde(default = "default_combo_marker")]
    pub combo_marker: String,
    /// Batch dispatch interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Hard per-load deadline in seconds. Independent of, and much longer
    /// than, the poll interval.
    #[serde(default = "default_load_timeout_secs")]
    pub load_timeout_secs: u64,
    /// Content-type tag sent with each load, if configured.
    #[serde(default)]
    pub content_type: Option<String>,
    /// Character encoding, always applied.
    #[serde(default = "default_charset")]
    pub charset: String,
    /// Cross-origin policy value (e.g. "anonymous"). Applied only when the
    /// target's origin differs from `document_origin`.
    #[serde(default)]
    pub cross_origin: Option<String>,
    /// Origin of the embedding document, used for the cross-origin check.
    #[serde(default)]
    pub document_origin: Option<String>,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            allow_list: Vec::new(),
            combo_delimiter: default_delimiter(),
            combo_marker: default_combo_marker(),
            poll_interval_ms: default_poll_interval_ms(),
            load_timeout_secs: default_load_timeout_secs(),
            content_type: None,
            charset: default_charset(),
            cross_origin: None,
            document_origin: None,
        }
    }
}

impl ComboConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("cfl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ComboConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ComboConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: ComboConfig = toml::from_str(&data)?;
    Ok(cfg)
}
