use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::ConfigError;
use crate::converter::{ConversionOptions, FfmpegConfig, MorphdConfig, RasterConfig};
use crate::orchestrator::OrchestratorConfig;

/// Prefix for environment overrides.
const ENV_PREFIX: &str = "MORPHIX_";

/// Separator spelling out nesting in override names, e.g.
/// `MORPHIX_CONVERTERS__FFMPEG__TIMEOUT_SECS=120` targets
/// `converters.ffmpeg.timeout_secs` without colliding with the
/// underscores inside key names.
const ENV_NESTING: &str = "__";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Orchestrator queues and output location.
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Converter backend configuration.
    #[serde(default)]
    pub converters: ConvertersConfig,

    /// User-facing settings defaults.
    #[serde(default)]
    pub settings: UserSettings,
}

impl Config {
    /// Reads the TOML file at `path`, then layers `MORPHIX_*`
    /// environment overrides on top of it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        Self::extract(Figment::from(Toml::file(path)))
    }

    /// Builds a configuration from defaults and `MORPHIX_*` environment
    /// overrides alone, for running without a config file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::extract(Figment::new())
    }

    /// Parses a TOML document, ignoring the environment.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn extract(base: Figment) -> Result<Self, ConfigError> {
        base.merge(Env::prefixed(ENV_PREFIX).split(ENV_NESTING))
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

/// Configuration of the fixed converter set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertersConfig {
    /// FFmpeg audio-path backend.
    #[serde(default)]
    pub ffmpeg: FfmpegConfig,

    /// In-process raster image backend.
    #[serde(default)]
    pub raster: RasterConfig,

    /// Remote morphd video backend; absent disables remote conversion.
    #[serde(default)]
    pub morphd: Option<MorphdConfig>,
}

/// User-configurable settings defaults, loaded from the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    /// Filename template for downloads.
    #[serde(default = "default_filename_format")]
    pub filename_format: String,

    /// Backend-specific conversion knobs.
    #[serde(default)]
    pub options: ConversionOptions,
}

fn default_filename_format() -> String {
    "MORPHIX_%name%".to_string()
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            filename_format: default_filename_format(),
            options: ConversionOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.settings.filename_format, "MORPHIX_%name%");
        assert!(config.converters.morphd.is_none());
    }

    #[test]
    fn test_from_toml() {
        let config = Config::from_toml(
            r#"
[orchestrator]
max_parallel_conversions = 2

[settings]
filename_format = "OUT_%name%"
"#,
        )
        .unwrap();
        assert_eq!(config.orchestrator.max_parallel_conversions, 2);
        assert_eq!(config.settings.filename_format, "OUT_%name%");
    }

    #[test]
    fn test_from_toml_empty_document_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert!(config.orchestrator.max_parallel_conversions >= 1);
        assert_eq!(config.settings.filename_format, "MORPHIX_%name%");
    }

    #[test]
    fn test_load_missing_file_is_reported() {
        let result = Config::load(Path::new("/nonexistent/morphix.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_reads_file_values() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[orchestrator]
max_parallel_conversions = 3
output_dir = "/tmp/converted"

[converters.ffmpeg]
timeout_secs = 120
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.orchestrator.max_parallel_conversions, 3);
        assert_eq!(config.converters.ffmpeg.timeout_secs, 120);
    }

    #[test]
    fn test_morphd_enabled_by_section_presence() {
        let config = Config::from_toml(
            r#"
[converters.morphd]
url = "http://morphd.local:8000"
"#,
        )
        .unwrap();
        assert!(config.converters.morphd.is_some());
    }
}
