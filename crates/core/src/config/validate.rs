use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Queue bounds are non-zero
/// - Thumbnail dimension is non-zero
/// - Image quality stays in 1..=100
/// - Filename template and morphd URL are non-empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.orchestrator.max_parallel_conversions == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.max_parallel_conversions cannot be 0".to_string(),
        ));
    }

    if config.orchestrator.thumbnail_concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.thumbnail_concurrency cannot be 0".to_string(),
        ));
    }

    if config.orchestrator.thumbnail.max_dimension == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.thumbnail.max_dimension cannot be 0".to_string(),
        ));
    }

    if let Some(quality) = config.settings.options.image_quality {
        if !(1..=100).contains(&quality) {
            return Err(ConfigError::ValidationError(
                "settings.options.image_quality must be between 1 and 100".to_string(),
            ));
        }
    }

    if config.settings.filename_format.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "settings.filename_format cannot be empty".to_string(),
        ));
    }

    if let Some(ref morphd) = config.converters.morphd {
        if morphd.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "converters.morphd.url cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_zero_concurrency_fails() {
        let mut config = Config::default();
        config.orchestrator.max_parallel_conversions = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_image_quality_range() {
        let mut config = Config::default();
        config.settings.options.image_quality = Some(0);
        assert!(validate_config(&config).is_err());

        config.settings.options.image_quality = Some(101);
        assert!(validate_config(&config).is_err());

        config.settings.options.image_quality = Some(85);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_empty_filename_format_fails() {
        let mut config = Config::default();
        config.settings.filename_format = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_morphd_url_fails() {
        let mut config = Config::default();
        config.converters.morphd = Some(crate::converter::MorphdConfig::new(""));
        assert!(validate_config(&config).is_err());
    }
}
