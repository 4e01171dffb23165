//! Configuration for the layout designer

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::model::{PaddingKind, UNBOUNDED};

/// Errors loading a designer configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Paddings used when the metrics provider has no entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaddingDefaults {
    pub related: i32,
    pub unrelated: i32,
    pub separate: i32,
    pub indent: i32,
    /// Distance to the border of the parent container
    pub container: i32,
}

impl Default for PaddingDefaults {
    fn default() -> Self {
        Self {
            related: 6,
            unrelated: 12,
            separate: 18,
            indent: 10,
            container: 10,
        }
    }
}

impl PaddingDefaults {
    pub fn for_kind(&self, kind: PaddingKind) -> i32 {
        match kind {
            PaddingKind::Related => self.related,
            PaddingKind::Unrelated => self.unrelated,
            PaddingKind::Separate => self.separate,
            PaddingKind::Indent => self.indent,
        }
    }
}

/// Configuration options for gesture handling and layout computation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DesignerConfig {
    /// A candidate snaps when it is strictly closer than this many pixels
    pub snap_distance: i32,

    /// Orthogonal slack allowed when snapping "next to" a component
    pub orthogonal_distance: i32,

    /// Fallback paddings
    pub paddings: PaddingDefaults,

    /// Size treated as unbounded
    pub max_size: i32,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            snap_distance: 8,
            orthogonal_distance: 8,
            paddings: PaddingDefaults::default(),
            max_size: UNBOUNDED,
        }
    }
}

impl DesignerConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the snapping tolerance
    pub fn with_snap_distance(mut self, distance: i32) -> Self {
        self.snap_distance = distance;
        self
    }

    /// Set the orthogonal slack for "next to" snapping
    pub fn with_orthogonal_distance(mut self, distance: i32) -> Self {
        self.orthogonal_distance = distance;
        self
    }

    /// Set the fallback paddings
    pub fn with_paddings(mut self, paddings: PaddingDefaults) -> Self {
        self.paddings = paddings;
        self
    }

    /// Parse a configuration from TOML; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
