//! Orchestrator configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::thumbnail::ThumbnailConfig;

/// Configuration for the orchestrator's queues and output location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Maximum parallel conversions.
    #[serde(default = "default_parallelism")]
    pub max_parallel_conversions: usize,

    /// Maximum parallel thumbnail generations.
    #[serde(default = "default_parallelism")]
    pub thumbnail_concurrency: usize,

    /// Directory where batch archives are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Thumbnail pipeline configuration.
    #[serde(default)]
    pub thumbnail: ThumbnailConfig,
}

/// Available hardware parallelism, falling back to 4 when unknown.
fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_parallel_conversions: default_parallelism(),
            thumbnail_concurrency: default_parallelism(),
            output_dir: default_output_dir(),
            thumbnail: ThumbnailConfig::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Sets the maximum parallel conversions.
    pub fn with_max_conversions(mut self, max: usize) -> Self {
        self.max_parallel_conversions = max;
        self
    }

    /// Sets the thumbnail concurrency.
    pub fn with_thumbnail_concurrency(mut self, max: usize) -> Self {
        self.thumbnail_concurrency = max;
        self
    }

    /// Sets the archive output directory.
    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_positive_bounds() {
        let config = OrchestratorConfig::default();
        assert!(config.max_parallel_conversions >= 1);
        assert!(config.thumbnail_concurrency >= 1);
    }

    #[test]
    fn test_config_builder() {
        let config = OrchestratorConfig::default()
            .with_max_conversions(2)
            .with_thumbnail_concurrency(3)
            .with_output_dir(PathBuf::from("/tmp/out"));

        assert_eq!(config.max_parallel_conversions, 2);
        assert_eq!(config.thumbnail_concurrency, 3);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: OrchestratorConfig = toml::from_str("").unwrap();
        assert!(config.max_parallel_conversions >= 1);
        assert_eq!(config.output_dir, PathBuf::from("."));
    }
}
