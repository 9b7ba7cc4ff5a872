//! Sub-configuration structs. Defaults reproduce the classic http→https run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory tree to rewrite; the CLI argument takes precedence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<PathBuf>,
}

/// What to match and what to substitute.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// File name suffix to select (case-sensitive), e.g. ".html"
    pub extension: String,

    /// Literal text to search for
    pub from: String,

    /// Literal replacement text
    pub to: String,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            extension: ".html".to_string(),
            from: "http://".to_string(),
            to: "https://".to_string(),
        }
    }
}

impl RewriteConfig {
    /// Extension as a file name suffix, with a leading dot added if missing.
    pub fn extension_suffix(&self) -> String {
        if self.extension.starts_with('.') {
            self.extension.clone()
        } else {
            format!(".{}", self.extension)
        }
    }
}

/// Worker pool and queue sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Concurrent workers per stage
    pub workers: usize,

    /// Max jobs buffered between two stages
    pub buffer_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 30,
            buffer_size: 50,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_suffix_adds_dot() {
        let mut config = RewriteConfig::default();
        assert_eq!(config.extension_suffix(), ".html");

        config.extension = "htm".to_string();
        assert_eq!(config.extension_suffix(), ".htm");
    }
}
