// Global configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::engine::EncodingPolicy;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub encoding: EncodingPolicy,

    #[serde(default)]
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Replace existing outputs instead of skipping them
    #[serde(default)]
    pub overwrite: bool,

    /// Remux (instead of re-encode) sources already within the 480p H.264 profile
    #[serde(default = "default_true_config")]
    pub skip_if_compliant: bool,

    /// Try hardware-accelerated decoding first when ffmpeg offers a backend
    #[serde(default = "default_true_config")]
    pub use_hwaccel: bool,

    /// Parent directory for in-progress encodes (system temp dir if unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
}

fn default_true_config() -> bool {
    true
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            overwrite: false,         // Default to not overwriting
            skip_if_compliant: true,  // Remux already-480p sources
            use_hwaccel: true,        // Falls back to software on failure
            temp_dir: None,
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "macos") {
            dirs::home_dir()
                .context("Could not determine home directory")?
                .join(".config")
                .join("ffshrink")
        } else {
            dirs::config_dir()
                .context("Could not determine config directory")?
                .join("ffshrink")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Parse config from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse config")
    }

    /// Load config from disk, or create default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;

            Self::from_toml(&contents)
                .with_context(|| format!("Invalid config file: {}", config_path.display()))
        } else {
            let config = Config::default();

            // Try to save the default config, but don't fail if we can't
            // (e.g., if the directory isn't writable)
            if let Err(e) = config.save() {
                tracing::warn!("Could not create default config file: {:#}", e);
                tracing::warn!(
                    "Using built-in defaults. Run 'ffshrink init-config' to create a config file."
                );
            }

            Ok(config)
        }
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Create parent directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }
}
