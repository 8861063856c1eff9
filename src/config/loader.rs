//! Configuration loader with layered path resolution
//!
//! Loads configuration from multiple locations with layered priority:
//! 1. `~/.config/polyrun/config.toml` (lowest priority, shared toolchains)
//! 2. `polyrun.toml` at the project root (or the `--config` override)
//! 3. `POLYRUN_*` environment variables (highest priority)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use super::model::Config;

/// Application name used for the user config directory
const APP_NAME: &str = "polyrun";

/// Project configuration file name
pub const CONFIG_FILE_NAME: &str = "polyrun.toml";

/// A loaded configuration and the project root it belongs to
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Absolute project root (directory containing the project config file)
    pub root: PathBuf,
    /// Path of the project config file
    pub path: PathBuf,
    pub config: Config,
}

/// User-level config path, if a config directory exists on this platform
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME).join("config.toml"))
}

/// Search `start` and its ancestors for `polyrun.toml`
pub fn find_project_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Load configuration with layering
///
/// # Arguments
/// * `override_path` - Explicit project config file; when `None`, the current
///   directory and its ancestors are searched for `polyrun.toml`
///
/// # Returns
/// * `Result<LoadedConfig>` - The merged configuration and its project root
pub fn load_config(override_path: Option<&str>) -> Result<LoadedConfig> {
    let path = match override_path {
        Some(path) => {
            let path = PathBuf::from(path);
            if !path.is_file() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            path
        }
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            find_project_config(&cwd).with_context(|| {
                format!(
                    "No {} found in {} or any parent directory",
                    CONFIG_FILE_NAME,
                    cwd.display()
                )
            })?
        }
    };

    load_config_file(&path)
}

/// Load a specific project config file, layered over user config and
/// under environment overrides
pub fn load_config_file(path: &Path) -> Result<LoadedConfig> {
    let path = path
        .canonicalize()
        .with_context(|| format!("Failed to resolve config path {}", path.display()))?;
    let root = path
        .parent()
        .map(Path::to_path_buf)
        .context("Config file has no parent directory")?;

    let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

    if let Some(user) = user_config_path().filter(|p| p.is_file()) {
        tracing::debug!("Loading user config from: {}", user.display());
        figment = figment.merge(Toml::file(&user));
    }

    tracing::debug!("Loading project config from: {}", path.display());
    figment = figment.merge(Toml::file(&path));

    // Format: POLYRUN_DEFAULTS__TIMEOUT=600
    // Maps to: defaults.timeout = 600
    figment = figment.merge(Env::prefixed("POLYRUN_").split("__"));

    let config: Config = figment
        .extract()
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

    Ok(LoadedConfig { root, path, config })
}
