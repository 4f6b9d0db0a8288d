//! Application configuration for pinedocs.
//!
//! User config lives at `~/.pinedocs/pinedocs.toml`.
//! CLI flags override config file values, which override defaults.
//!
//! Only paths and crawl politeness settings are configurable. The cleaning
//! patterns, content gate, and section keywords are fixed in
//! `pinedocs-markdown`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{PineDocsError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "pinedocs.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".pinedocs";

// ---------------------------------------------------------------------------
// Config structs (matching pinedocs.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input/output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Crawler settings.
    #[serde(default)]
    pub crawl: CrawlSettings,
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the downloaded `*.md` pages, relative to the
    /// working directory unless absolute.
    #[serde(default = "default_input_dir")]
    pub input_dir: String,

    /// Name of the output directory created inside `input_dir`.
    #[serde(default = "default_output_subdir")]
    pub output_subdir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_subdir: default_output_subdir(),
        }
    }
}

fn default_input_dir() -> String {
    "pinescript_docs".into()
}
fn default_output_subdir() -> String {
    "processed".into()
}

/// `[crawl]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSettings {
    /// Root of the documentation site. Only links under it are followed.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Page (relative to `base_url`) whose navigation lists every doc page.
    #[serde(default = "default_start_page")]
    pub start_page: String,

    /// Pages fetched per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause after each batch, in milliseconds.
    #[serde(default = "default_batch_delay")]
    pub batch_delay_ms: u64,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            start_page: default_start_page(),
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.tradingview.com/pine-script-docs".into()
}
fn default_start_page() -> String {
    "welcome/".into()
}
fn default_batch_size() -> usize {
    3
}
fn default_batch_delay() -> u64 {
    2000
}
fn default_timeout() -> u64 {
    30
}

// ---------------------------------------------------------------------------
// Crawl config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime crawl configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Documentation root, without a trailing slash.
    pub base_url: String,
    /// Navigation page relative to `base_url`.
    pub start_page: String,
    /// Pages per batch.
    pub batch_size: usize,
    /// Pause after each batch, in ms.
    pub batch_delay_ms: u64,
    /// Per-request timeout, in seconds.
    pub timeout_secs: u64,
}

impl From<&AppConfig> for CrawlConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.crawl.base_url.trim_end_matches('/').to_string(),
            start_page: config.crawl.start_page.clone(),
            batch_size: config.crawl.batch_size,
            batch_delay_ms: config.crawl.batch_delay_ms,
            timeout_secs: config.crawl.timeout_secs,
        }
    }
}

impl CrawlConfig {
    /// Check that the merged settings can drive a crawl.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(PineDocsError::config("crawl.batch_size must be at least 1"));
        }

        let url = Url::parse(&self.base_url).map_err(|e| {
            PineDocsError::config(format!("crawl.base_url '{}' is invalid: {e}", self.base_url))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(PineDocsError::config(format!(
                "crawl.base_url must be http(s), got '{}'",
                url.scheme()
            )));
        }

        Ok(())
    }

    /// Full URL of the navigation page.
    pub fn start_url(&self) -> String {
        format!("{}/{}", self.base_url, self.start_page.trim_start_matches('/'))
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.pinedocs/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PineDocsError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.pinedocs/pinedocs.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PineDocsError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        PineDocsError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PineDocsError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PineDocsError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PineDocsError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
