use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Logging configuration shared by SensorSight binaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level or filter directives, e.g. "info" or "info,sensorsight_poller=debug".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Replace the configured level when `level` is set (`--log-level`).
    pub fn with_level_override(mut self, level: Option<String>) -> Self {
        if let Some(level) = level {
            self.level = level;
        }
        self
    }

    /// Build the filter for the configured level.
    ///
    /// Unlike `EnvFilter::new`, a malformed directive is an error instead of
    /// being silently dropped.
    pub fn env_filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(&self.level)
            .map_err(|e| Error::Config(format!("Invalid log level '{}': {}", self.level, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        #[serde(default)]
        logging: LoggingConfig,
    }

    #[test]
    fn test_default_logging() {
        let config: Wrapper = json5::from_str("{}").unwrap();

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_json_logging_format() {
        let json5 = r#"
        {
            // comments are allowed in JSON5
            logging: {
                level: "debug",
                format: "json",
            },
        }
        "#;

        let config: Wrapper = json5::from_str(json5).unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_level_override() {
        let config = LoggingConfig::default().with_level_override(Some("debug".to_string()));
        assert_eq!(config.level, "debug");

        let config = LoggingConfig::default().with_level_override(None);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_env_filter_directives() {
        let config = LoggingConfig {
            level: "warn,sensorsight_poller=debug".to_string(),
            format: LogFormat::Text,
        };
        assert!(config.env_filter().is_ok());

        let config = LoggingConfig {
            level: "sensorsight_poller=loud".to_string(),
            format: LogFormat::Text,
        };
        let err = config.env_filter().unwrap_err();
        assert!(err.to_string().contains("Invalid log level"));
    }
}
