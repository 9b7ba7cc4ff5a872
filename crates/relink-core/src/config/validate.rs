//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];
const LOG_FORMATS: &[&str] = &["pretty", "json"];

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.workers == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.workers must be > 0".into(),
            ));
        }
        if self.pipeline.buffer_size == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.buffer_size must be > 0".into(),
            ));
        }
        if self.rewrite.extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::ValidationError(
                "rewrite.extension must not be empty".into(),
            ));
        }
        // An empty pattern would match between every character.
        if self.rewrite.from.is_empty() {
            return Err(ConfigError::ValidationError(
                "rewrite.from must not be empty".into(),
            ));
        }
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {}",
                LOG_LEVELS.join(", ")
            )));
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.format must be one of {}",
                LOG_FORMATS.join(", ")
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let mut config = Config::default();
        config.pipeline.workers = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pipeline.workers"));
    }

    #[test]
    fn test_validate_rejects_zero_buffer() {
        let mut config = Config::default();
        config.pipeline.buffer_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("buffer_size"));
    }

    #[test]
    fn test_validate_rejects_empty_extension() {
        let mut config = Config::default();
        config.rewrite.extension = ".".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("rewrite.extension"));
    }

    #[test]
    fn test_validate_rejects_empty_from() {
        let mut config = Config::default();
        config.rewrite.from = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("rewrite.from"));
    }

    #[test]
    fn test_validate_allows_empty_to() {
        let mut config = Config::default();
        config.rewrite.to = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_log_settings() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logging.level"));

        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logging.format"));
    }
}
