//! GraphKit configuration
//!
//! Options that the stub compiler passes when it sets up one graph build.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ConfigError, ConfigResult};

/// Allowed nesting range for structured contexts
pub const MAX_STRUCTURE_DEPTH_RANGE: (usize, usize) = (1, 1024);

/// Configuration for a single graph build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KitConfig {
    /// Graph name; falls back to the stub method name
    pub name: Option<String>,

    /// Attach a source position to every node
    pub track_node_source_position: bool,

    /// Record callee methods of every invoke in the graph
    pub record_called_methods: bool,

    /// Run the graph verifier in `finish()`
    pub verify_on_finish: bool,

    /// Nesting limit for branch / exception-edge contexts
    pub max_structure_depth: usize,
}

impl Default for KitConfig {
    fn default() -> Self {
        Self {
            name: None,
            track_node_source_position: false,
            record_called_methods: false,
            verify_on_finish: true,
            max_structure_depth: 64,
        }
    }
}

impl KitConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn track_node_source_position(mut self, enabled: bool) -> Self {
        self.track_node_source_position = enabled;
        self
    }

    pub fn record_called_methods(mut self, enabled: bool) -> Self {
        self.record_called_methods = enabled;
        self
    }

    pub fn verify_on_finish(mut self, enabled: bool) -> Self {
        self.verify_on_finish = enabled;
        self
    }

    pub fn max_structure_depth(mut self, depth: usize) -> Self {
        self.max_structure_depth = depth;
        self
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: KitConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Range checks
    pub fn validate(&self) -> ConfigResult<()> {
        let (min, max) = MAX_STRUCTURE_DEPTH_RANGE;
        if !(min..=max).contains(&self.max_structure_depth) {
            return Err(ConfigError::range_with_hint(
                "max_structure_depth",
                self.max_structure_depth,
                min,
                max,
                "Stub bodies rarely nest more than a handful of branches.",
            ));
        }
        Ok(())
    }
}
