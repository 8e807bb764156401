//! Renderer configuration loaded from YAML

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Tree rendering options; every field is optional in the file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    /// Deepest level whose children are expanded
    pub max_depth: usize,

    /// Entries shown in an object preview
    pub object_preview_max: usize,

    /// Elements shown in an array preview
    pub array_preview_max: usize,

    /// Append schema descriptions to node labels
    pub show_descriptions: bool,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            object_preview_max: 5,
            array_preview_max: 10,
            show_descriptions: true,
        }
    }
}

impl InspectConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as null
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading config from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}
