use anyhow::{anyhow, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::domains::DEFAULT_SUPPORTED_DOMAINS;

/// The structure of our configuration file (config.toml)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Path or name of the yt-dlp executable.
    pub ytdlp_path: String,
    /// Default for requests that don't set `enable_remote` themselves.
    pub enable_remote: bool,
    pub extraction_timeout_secs: u64,
    /// Answer 404 instead of an empty 200 when a download selection finds nothing.
    pub empty_selection_not_found: bool,
    pub supported_domains: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ytdlp_path: "yt-dlp".to_string(),
            enable_remote: true,
            extraction_timeout_secs: 30,
            empty_selection_not_found: false,
            supported_domains: DEFAULT_SUPPORTED_DOMAINS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl Config {
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// `HOST` and `PORT` from the environment win over the file.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(host) = std::env::var("HOST") {
            self.host = host;
        }
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            self.port = port;
        }
        self
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Returns the cross-platform path to the configuration file, creating the directory if needed.
async fn default_config_path() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("com", "YtDlpLinkApi", "yt-dlp-link-api")
        .ok_or_else(|| anyhow!("Could not find a valid home directory to store config"))?;

    let config_dir = project_dirs.config_dir();
    fs::create_dir_all(config_dir).await?;

    Ok(config_dir.join("config.toml"))
}

/// Loads the configuration from `path` (or the platform default location),
/// writing a default file first if none exists.
pub async fn load_config(path: Option<&Path>) -> Result<Config> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path().await?,
    };

    if !config_path.exists() {
        tracing::info!(
            "No config file found. Creating a default one at: {}",
            config_path.display()
        );
        let default_config = Config::default();
        save_config(&default_config, &config_path).await?;
        return Ok(default_config);
    }

    let config_content = fs::read_to_string(&config_path).await?;
    let mut config: Config = toml::from_str(&config_content)
        .map_err(|e| anyhow!("Failed to parse config file at {}: {}", config_path.display(), e))?;

    if config.extraction_timeout_secs == 0 {
        let default_secs = Config::default().extraction_timeout_secs;
        tracing::warn!(
            "extraction_timeout_secs = 0 in {} would time out every request, using {}s",
            config_path.display(),
            default_secs
        );
        config.extraction_timeout_secs = default_secs;
    }

    Ok(config)
}

/// Saves the provided configuration object to `path`.
pub async fn save_config(config: &Config, path: &Path) -> Result<()> {
    let toml_string = toml::to_string_pretty(config)?;
    fs::write(path, toml_string).await?;
    Ok(())
}
