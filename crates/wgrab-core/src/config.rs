use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Embed hosts recognised on a game page, most specific first.
pub const DEFAULT_EMBED_HOST_FRAGMENTS: &[&str] = &["html-classic.itch.zone", "itch.zone"];

/// Script markers of the hosting site's own loader/tracking scripts.
pub const DEFAULT_STRIP_SCRIPT_MARKERS: &[&str] = &["itch.io", "htmlgame.js"];

/// Retry policy parameters (optional `[retry]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per request (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.5 = 500ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.5,
            max_delay_secs: 10,
        }
    }
}

/// Global configuration loaded from `~/.config/wgrab/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WgrabConfig {
    /// Directory bundles are written into (None = current directory).
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Maximum number of asset downloads in flight at once.
    pub max_concurrent_fetches: usize,
    /// TCP/TLS connect timeout for every request.
    pub connect_timeout_secs: u64,
    /// Total timeout for the host page and embed page.
    pub page_timeout_secs: u64,
    /// Total timeout for a single asset download.
    pub asset_timeout_secs: u64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
    /// Override for the embed-host fragments searched on the host page.
    #[serde(default)]
    pub embed_host_fragments: Option<Vec<String>>,
    /// Override for the script markers stripped from the standalone page.
    #[serde(default)]
    pub strip_script_markers: Option<Vec<String>>,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for WgrabConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            max_concurrent_fetches: 4,
            connect_timeout_secs: 15,
            page_timeout_secs: 30,
            asset_timeout_secs: 600,
            user_agent: concat!("wgrab/", env!("CARGO_PKG_VERSION")).to_string(),
            embed_host_fragments: None,
            strip_script_markers: None,
            retry: None,
        }
    }
}

impl WgrabConfig {
    pub fn retry_config(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn asset_timeout(&self) -> Duration {
        Duration::from_secs(self.asset_timeout_secs)
    }

    pub fn embed_host_fragments(&self) -> Vec<String> {
        self.embed_host_fragments.clone().unwrap_or_else(|| {
            DEFAULT_EMBED_HOST_FRAGMENTS
                .iter()
                .map(|s| s.to_string())
                .collect()
        })
    }

    pub fn strip_script_markers(&self) -> Vec<String> {
        self.strip_script_markers.clone().unwrap_or_else(|| {
            DEFAULT_STRIP_SCRIPT_MARKERS
                .iter()
                .map(|s| s.to_string())
                .collect()
        })
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("wgrab")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<WgrabConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = WgrabConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg: WgrabConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
