//! Daemon settings file
//!
//! A small TOML file tunes the solver weights and the database location.
//! Everything has a default; running without a settings file is the
//! normal case.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::layout::LayoutConfig;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Daemon configuration, as read from the settings file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub solver: SolverSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

/// `[solver]` section: objective weights (see [`LayoutConfig`])
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolverSettings {
    #[serde(default = "default_weight")]
    pub gap_weight: u32,
    #[serde(default = "default_weight")]
    pub alignment_weight: u32,
}

fn default_weight() -> u32 {
    1
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            gap_weight: 1,
            alignment_weight: 1,
        }
    }
}

/// `[storage]` section: where remembered layouts live
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageSettings {
    /// Database file; defaults to `screenplan/layouts.json` under the
    /// user's config directory
    pub database: Option<PathBuf>,
}

impl Settings {
    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load settings from a TOML string
    pub fn from_str(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    /// The solver weights as a layout-engine configuration
    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig::new()
            .with_gap_weight(self.solver.gap_weight)
            .with_alignment_weight(self.solver.alignment_weight)
    }

    /// Resolve the database path: explicit setting first, then the
    /// platform config directory, then the current directory as a last
    /// resort.
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.storage.database {
            return path.clone();
        }
        match dirs::config_dir() {
            Some(config) => config.join("screenplan").join("layouts.json"),
            None => PathBuf::from("screenplan-layouts.json"),
        }
    }
}
