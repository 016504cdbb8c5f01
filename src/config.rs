use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{LazylabError, Result};

/// Account and server settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    pub user: String,
    pub user_id: u64,
    pub server: String,
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

/// ~/.config/lazylab/config.toml (Linux) or ~/Library/Application Support/lazylab/config.toml (macOS)
fn xdg_config_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("lazylab").join("config.toml"))
}

/// ~/.lazylab, JSON
fn legacy_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(LazylabError::NoHomeDir)?;
    Ok(home.join(".lazylab"))
}

impl Config {
    /// Load from `explicit` if given, otherwise from the first existing default location.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match xdg_config_path().filter(|p| p.exists()) {
                Some(path) => path,
                None => legacy_config_path()?,
            },
        };
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| LazylabError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, ConfigFormat::for_path(path))
    }

    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        match format {
            ConfigFormat::Json => serde_json::from_str(content)
                .map_err(|e| LazylabError::ConfigParse(e.to_string())),
            ConfigFormat::Toml => {
                toml::from_str(content).map_err(|e| LazylabError::ConfigParse(e.to_string()))
            }
        }
    }
}
