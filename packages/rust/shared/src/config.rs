//! Application configuration for dashtree.
//!
//! User config lives at `~/.dashtree/dashtree.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DashtreeError, Result};
use crate::types::LabelMap;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "dashtree.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".dashtree";

// ---------------------------------------------------------------------------
// Config structs (matching dashtree.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Tree construction settings.
    #[serde(default)]
    pub build: BuildConfig,

    /// Event stream settings.
    #[serde(default)]
    pub render: RenderConfig,

    /// Global labels. Collection labels override these.
    #[serde(default)]
    pub labels: LabelMap,
}

/// Where a deep item goes when no same-filter slot exists at its prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnresolvedPolicy {
    /// Descend into the structural group keyed by the segment, shared by
    /// every branch at that level.
    #[default]
    SharedContainer,
    /// Attach beneath the first slot registered at the prefix.
    EarliestCandidate,
}

impl std::fmt::Display for UnresolvedPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SharedContainer => f.write_str("shared-container"),
            Self::EarliestCandidate => f.write_str("earliest-candidate"),
        }
    }
}

/// `[build]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Fallback for unresolved attachments.
    #[serde(default)]
    pub unresolved_policy: UnresolvedPolicy,
}

/// `[render]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Depth reported for top-level tabs.
    #[serde(default = "default_base_depth")]
    pub base_depth: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            base_depth: default_base_depth(),
        }
    }
}

fn default_base_depth() -> usize {
    1
}

// ---------------------------------------------------------------------------
// Build options (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime options for turning a collection into page trees.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub unresolved_policy: UnresolvedPolicy,
    pub base_depth: usize,
    /// Labels applied beneath each collection's own labels.
    pub labels: LabelMap,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for BuildOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            unresolved_policy: config.build.unresolved_policy,
            base_depth: config.render.base_depth,
            labels: config.labels.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.dashtree/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DashtreeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.dashtree/dashtree.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| DashtreeError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        DashtreeError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    init_config_in(&config_dir()?)
}

/// Write a default config file into `dir`, creating it if needed.
pub fn init_config_in(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| DashtreeError::io(dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DashtreeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DashtreeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
