//! Configuration handling for the MRH CLI
//!
//! Supports loading configuration from mrh.toml files with CLI argument overrides.

use anyhow::{Context, Result};
use mrh_core::{RenderConfig, ViewerSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CliError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderSection,
    #[serde(default)]
    pub viewer: ViewerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSection {
    /// Canvas width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Canvas height in pixels
    #[serde(default = "default_height")]
    pub height: u32,

    /// Color for the lowest score
    #[serde(default = "default_min_color")]
    pub min_color: String,

    /// Color for the highest score
    #[serde(default = "default_max_color")]
    pub max_color: String,
}

fn default_width() -> u32 { 320 }
fn default_height() -> u32 { 320 }
fn default_min_color() -> String { "000000".to_string() }
fn default_max_color() -> String { "ffffff".to_string() }

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            min_color: default_min_color(),
            max_color: default_max_color(),
        }
    }
}

/// Flag values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct RenderOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub min_color: Option<String>,
    pub max_color: Option<String>,
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                let default_path = PathBuf::from("mrh.toml");
                if default_path.exists() {
                    log::info!("Loading configuration from: mrh.toml");
                    Self::load_from_file(&default_path)?
                } else {
                    log::debug!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        // CliError so a bad file gets the config suggestions
        let config: Config = toml::from_str(&content).map_err(CliError::from)?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(CliError::from)?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> Result<String> {
        Ok(toml::to_string_pretty(&Self::default()).map_err(CliError::from)?)
    }

    pub fn render_config(&self, overrides: &RenderOverrides) -> RenderConfig {
        RenderConfig {
            canvas_width: overrides.width.unwrap_or(self.render.width),
            canvas_height: overrides.height.unwrap_or(self.render.height),
            min_color: overrides.min_color.clone().unwrap_or_else(|| self.render.min_color.clone()),
            max_color: overrides.max_color.clone().unwrap_or_else(|| self.render.max_color.clone()),
        }
    }
}
