use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::archive::policy::{ExtractionPolicy, DEFAULT_ALLOWED_MIME};
use crate::scanner::ClamdEndpoint;

/// clamd connection parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClamdConfig {
    pub host: String,
    pub port: u16,
    /// Wall-clock budget for one whole scan exchange, in seconds.
    pub timeout_secs: u64,
    /// When false, extraction policies are built with scanning off.
    pub enabled: bool,
}

impl Default for ClamdConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3310,
            timeout_secs: 30,
            enabled: true,
        }
    }
}

/// Resource bounds (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Cap on a single entry's decompressed size, in bytes.
    pub per_entry_max_bytes: u64,
    /// Cap on entries returned by an archive preview.
    pub max_preview_entries: usize,
    /// Concurrent sniff/scan/commit workers per extraction.
    pub extract_workers: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            per_entry_max_bytes: 25 * 1024 * 1024,
            max_preview_entries: 256,
            extract_workers: 4,
        }
    }
}

/// Global configuration loaded from `~/.config/agate/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Store root directory; when unset, the XDG data dir is used.
    #[serde(default)]
    pub store_root: Option<PathBuf>,
    #[serde(default)]
    pub clamd: ClamdConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    /// MIME types admitted by extraction, decided by content sniffing.
    #[serde(default = "default_allowed_mime")]
    pub allowed_mime: Vec<String>,
}

fn default_allowed_mime() -> Vec<String> {
    DEFAULT_ALLOWED_MIME.iter().map(|s| s.to_string()).collect()
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            store_root: None,
            clamd: ClamdConfig::default(),
            limits: LimitsConfig::default(),
            allowed_mime: default_allowed_mime(),
        }
    }
}

impl IngestConfig {
    /// Resolve the store root: configured path or the XDG data dir.
    pub fn store_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.store_root {
            return Ok(root.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("agate")?;
        Ok(xdg_dirs.get_data_home().join("store"))
    }

    pub fn clamd_endpoint(&self) -> ClamdEndpoint {
        ClamdEndpoint {
            host: self.clamd.host.clone(),
            port: self.clamd.port,
            timeout: Duration::from_secs(self.clamd.timeout_secs),
        }
    }

    /// Build the extraction policy this configuration implies.
    pub fn extraction_policy(&self) -> ExtractionPolicy {
        ExtractionPolicy {
            allowed_mime: self.allowed_mime.iter().cloned().collect(),
            virus_scan: self.clamd.enabled,
            per_entry_max_bytes: Some(self.limits.per_entry_max_bytes),
            prioritize_html: true,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("agate")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<IngestConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = IngestConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: IngestConfig = toml::from_str(&data)?;
    Ok(cfg)
}
