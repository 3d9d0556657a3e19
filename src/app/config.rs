use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_BACKEND_URL, ENV_CONFIG_PREFIX, HEALTH_CHECK_TIMEOUT_SECS, HTTP_REQUEST_TIMEOUT_SECS,
};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Generation backend
    #[serde(default)]
    pub backend: BackendConfig,

    /// Terminal presentation
    #[serde(default)]
    pub ui: UIConfig,
}

/// Where the generation backend lives and how long to wait for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL; empty means the same-origin proxy address
    pub base_url: String,
    /// Timeout for every workflow request
    pub timeout_secs: u64,
    /// Timeout for each liveness probe
    pub health_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: HTTP_REQUEST_TIMEOUT_SECS,
            health_timeout_secs: HEALTH_CHECK_TIMEOUT_SECS,
        }
    }
}

impl BackendConfig {
    /// Base URL with the empty-string default applied and no trailing slash
    pub fn resolved_base_url(&self) -> String {
        let url = self.base_url.trim();
        let url = if url.is_empty() {
            DEFAULT_BACKEND_URL
        } else {
            url
        };
        url.trim_end_matches('/').to_string()
    }
}

/// UI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UIConfig {
    /// Colorize terminal output
    pub color: bool,
    /// Print the 1-2-3-4 step indicator before each prompt
    pub show_step_indicator: bool,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            color: true,
            show_step_indicator: true,
        }
    }
}

/// Load configuration from multiple sources
///
/// Later sources win: defaults, global file, `.mailwizard/config.toml`,
/// then `MAILWIZARD_*` environment variables (`__` separates sections).
pub fn load_config() -> Result<Config> {
    let config_dir = get_config_dir()?;
    let global_config = config_dir.join("config.toml");
    let local_config = PathBuf::from(".mailwizard/config.toml");

    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if global_config.exists() {
        figment = figment.merge(Toml::file(&global_config));
    }

    if local_config.exists() {
        figment = figment.merge(Toml::file(&local_config));
    }

    figment = figment.merge(Env::prefixed(ENV_CONFIG_PREFIX).split("__"));

    figment.extract().context("Failed to load configuration")
}

/// Load configuration from an explicit file, still honoring the environment
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("Config file not found: {}", path.display());
    }

    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_CONFIG_PREFIX).split("__"))
        .extract()
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "mailwizard") {
        let config_dir = proj_dirs.config_dir();
        std::fs::create_dir_all(config_dir)?;
        Ok(config_dir.to_path_buf())
    } else {
        // Fallback to home directory
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        let config_dir = PathBuf::from(home).join(".config").join("mailwizard");
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = if let Some(p) = path {
        p
    } else {
        get_config_dir()?.join("config.toml")
    };

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Create a default configuration file if it doesn't exist
///
/// Returns the path of the file and whether it was newly written.
pub fn init_config() -> Result<(PathBuf, bool)> {
    let config_file = get_config_dir()?.join("config.toml");

    if config_file.exists() {
        return Ok((config_file, false));
    }

    save_config(&Config::default(), Some(config_file.clone()))?;
    Ok((config_file, true))
}
