use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::index::{grid::DEFAULT_TARGET_PER_CELL, IndexKind};

/// Attribute names tried, in this order, to find a region's name
pub const DEFAULT_NAME_FIELDS: [&str; 3] = ["NM_MUN", "NOME", "name"];

/// Invalid configuration values
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("`target_per_cell' must be greater than 0")]
    ZeroTargetPerCell,

    #[error("at least one name field is required")]
    NoNameFields,

    #[error("unknown index kind `{0}'. Expected one of grid, rtree, or linear.")]
    UnknownIndexKind(String),
}

/// Settings for building a [`Locator`](crate::Locator)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocatorConfig {
    /// The spatial index to build
    pub index: IndexKind,

    /// Number of regions a grid index aims to store per cell
    pub target_per_cell: usize,

    /// Attribute names tried in order when reporting a region; the first
    /// one present with a non-blank value wins
    pub name_fields: Vec<String>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            index: IndexKind::default(),
            target_per_cell: DEFAULT_TARGET_PER_CELL,
            name_fields: DEFAULT_NAME_FIELDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl LocatorConfig {
    /// Parses and validates a TOML configuration. Missing keys keep their
    /// default values.
    pub fn from_toml(s: &str) -> Result<Self> {
        let config: LocatorConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)
            .with_context(|| format!("Unable to read configuration file `{}'", path.display()))?;
        Self::from_toml(&s).with_context(|| format!("Invalid configuration file `{}'", path.display()))
    }

    /// Checks that all values are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_per_cell == 0 {
            return Err(ConfigError::ZeroTargetPerCell);
        }
        if self.name_fields.iter().all(|f| f.trim().is_empty()) {
            return Err(ConfigError::NoNameFields);
        }
        Ok(())
    }
}
