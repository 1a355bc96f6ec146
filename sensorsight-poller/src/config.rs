//! Configuration for the sensor poller.

use reqwest::Url;
use sensorsight_common::{LoggingConfig, PressureUnit, Quantity, TemperatureUnit};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Complete poller configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollerAppConfig {
    /// Endpoint, schedule and normalization settings
    #[serde(default)]
    pub poller: PollConfig,

    /// Render-time formatting
    #[serde(default)]
    pub display: DisplayConfig,

    /// Notification events
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PollerAppConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json5(&content)
    }

    /// Parse configuration from a JSON5 string.
    pub fn from_json5(content: &str) -> Result<Self, ConfigError> {
        let config: PollerAppConfig = json5::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.poller.validate()?;
        self.logging
            .env_filter()
            .map_err(|e| ConfigError::Validation(format!("logging.level: {}", e)))?;

        if self.display.decimals > 10 {
            return Err(ConfigError::Validation(format!(
                "display.decimals must be at most 10, got {}",
                self.display.decimals
            )));
        }

        Ok(())
    }
}

/// Settings for a single polled endpoint.
///
/// Immutable once handed to a [`Poller`](crate::poller::Poller).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Sensor endpoint (GET, JSON response)
    #[serde(default = "default_url")]
    pub url: String,

    /// Regular poll interval in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Delay before the extra fetch that follows a failure, in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Delay before the first fetch, in milliseconds
    #[serde(default)]
    pub initial_delay_ms: u64,

    /// Reject responses whose Content-Type is not JSON
    #[serde(default)]
    pub check_content_type: bool,

    /// Display unit for temperature; also gates the Fahrenheit heuristic
    #[serde(default)]
    pub temperature_unit: TemperatureUnit,

    /// Display unit for pressure
    #[serde(default)]
    pub pressure_unit: PressureUnit,

    /// JSON field names tried for each quantity, highest priority first
    #[serde(default)]
    pub field_aliases: FieldAliases,
}

fn default_url() -> String {
    "http://192.168.1.41/data".to_string()
}

fn default_interval_ms() -> u64 {
    30_000
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_retry_delay_ms() -> u64 {
    5_000
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            interval_ms: default_interval_ms(),
            timeout_ms: default_timeout_ms(),
            retry_delay_ms: default_retry_delay_ms(),
            initial_delay_ms: 0,
            check_content_type: false,
            temperature_unit: TemperatureUnit::default(),
            pressure_unit: PressureUnit::default(),
            field_aliases: FieldAliases::default(),
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// Validate the poll settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::Validation("poller.url must not be empty".into()));
        }

        let url = Url::parse(&self.url).map_err(|e| {
            ConfigError::Validation(format!("poller.url '{}' is invalid: {}", self.url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "poller.url must use http or https, got '{}'",
                url.scheme()
            )));
        }

        for (name, value) in [
            ("interval_ms", self.interval_ms),
            ("timeout_ms", self.timeout_ms),
            ("retry_delay_ms", self.retry_delay_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::Validation(format!(
                    "poller.{} must be greater than 0",
                    name
                )));
            }
        }

        Ok(())
    }
}

/// Ordered alias lists, one per quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAliases {
    #[serde(default = "default_temperature_aliases")]
    pub temperature: Vec<String>,

    #[serde(default = "default_humidity_aliases")]
    pub humidity: Vec<String>,

    #[serde(default = "default_pressure_aliases")]
    pub pressure: Vec<String>,
}

fn default_temperature_aliases() -> Vec<String> {
    vec!["temperature".to_string(), "temp".to_string()]
}

fn default_humidity_aliases() -> Vec<String> {
    vec!["humidity".to_string(), "hum".to_string()]
}

fn default_pressure_aliases() -> Vec<String> {
    vec![
        "pressure".to_string(),
        "pres".to_string(),
        "pressure_hpa".to_string(),
    ]
}

impl Default for FieldAliases {
    fn default() -> Self {
        Self {
            temperature: default_temperature_aliases(),
            humidity: default_humidity_aliases(),
            pressure: default_pressure_aliases(),
        }
    }
}

impl FieldAliases {
    /// Aliases for a quantity, highest priority first.
    pub fn for_quantity(&self, quantity: Quantity) -> &[String] {
        match quantity {
            Quantity::Temperature => &self.temperature,
            Quantity::Humidity => &self.humidity,
            Quantity::Pressure => &self.pressure,
        }
    }
}

/// Render-time formatting options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Heading shown above the values (empty to hide)
    #[serde(default = "default_title")]
    pub title: String,

    /// Decimal places for every value
    #[serde(default = "default_decimals")]
    pub decimals: usize,

    #[serde(default = "default_true")]
    pub show_temperature: bool,

    #[serde(default = "default_true")]
    pub show_humidity: bool,

    #[serde(default)]
    pub show_pressure: bool,
}

fn default_title() -> String {
    "Weather".to_string()
}

fn default_decimals() -> usize {
    1
}

fn default_true() -> bool {
    true
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            decimals: default_decimals(),
            show_temperature: true,
            show_humidity: true,
            show_pressure: false,
        }
    }
}

/// Notification event settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Prepended to every event name (e.g. "DHT_" gives "DHT_TEMPERATURE")
    #[serde(default)]
    pub prefix: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prefix: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = PollerAppConfig::from_json5("{}").unwrap();

        assert_eq!(config.poller.url, "http://192.168.1.41/data");
        assert_eq!(config.poller.interval(), Duration::from_secs(30));
        assert_eq!(config.poller.timeout(), Duration::from_secs(10));
        assert_eq!(config.poller.retry_delay(), Duration::from_secs(5));
        assert_eq!(config.poller.initial_delay(), Duration::ZERO);
        assert!(!config.poller.check_content_type);
        assert_eq!(config.poller.temperature_unit, TemperatureUnit::C);
        assert_eq!(config.poller.pressure_unit, PressureUnit::Hpa);
        assert_eq!(config.display.decimals, 1);
        assert!(!config.display.show_pressure);
        assert!(config.notifications.enabled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_default_aliases() {
        let aliases = FieldAliases::default();

        assert_eq!(
            aliases.for_quantity(Quantity::Temperature),
            &["temperature", "temp"]
        );
        assert_eq!(aliases.for_quantity(Quantity::Humidity), &["humidity", "hum"]);
        assert_eq!(
            aliases.for_quantity(Quantity::Pressure),
            &["pressure", "pres", "pressure_hpa"]
        );
    }

    #[test]
    fn test_parse_full_config() {
        let json5 = r#"
        {
            poller: {
                url: "http://sensor.local/data",
                interval_ms: 60000,
                timeout_ms: 2000,
                retry_delay_ms: 1000,
                check_content_type: true,
                temperature_unit: "F",
                pressure_unit: "mmHg",
                field_aliases: {
                    temperature: ["t", "temp_c"],
                },
            },
            display: { title: "", decimals: 2, show_pressure: true },
            notifications: { prefix: "DHT_" },
        }
        "#;

        let config = PollerAppConfig::from_json5(json5).unwrap();

        assert_eq!(config.poller.url, "http://sensor.local/data");
        assert_eq!(config.poller.interval_ms, 60000);
        assert!(config.poller.check_content_type);
        assert_eq!(config.poller.temperature_unit, TemperatureUnit::F);
        assert_eq!(config.poller.pressure_unit, PressureUnit::MmHg);
        assert_eq!(config.poller.field_aliases.temperature, vec!["t", "temp_c"]);
        // Unspecified alias lists keep their defaults
        assert_eq!(config.poller.field_aliases.humidity, vec!["humidity", "hum"]);
        assert_eq!(config.display.title, "");
        assert_eq!(config.display.decimals, 2);
        assert!(config.display.show_pressure);
        assert_eq!(config.notifications.prefix, "DHT_");
    }

    #[test]
    fn test_zero_durations_rejected() {
        for field in ["interval_ms", "timeout_ms", "retry_delay_ms"] {
            let json5 = format!("{{ poller: {{ {}: 0 }} }}", field);
            let err = PollerAppConfig::from_json5(&json5).unwrap_err();
            assert!(
                matches!(&err, ConfigError::Validation(msg) if msg.contains(field)),
                "unexpected error for {}: {}",
                field,
                err
            );
        }
    }

    #[test]
    fn test_invalid_urls_rejected() {
        for url in ["", "   ", "not a url", "ftp://sensor.local/data"] {
            let json5 = format!("{{ poller: {{ url: \"{}\" }} }}", url);
            assert!(
                matches!(
                    PollerAppConfig::from_json5(&json5),
                    Err(ConfigError::Validation(_))
                ),
                "url '{}' should be rejected",
                url
            );
        }
    }

    #[test]
    fn test_excessive_decimals_rejected() {
        let result = PollerAppConfig::from_json5("{ display: { decimals: 11 } }");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let result = PollerAppConfig::from_json5(r#"{ logging: { level: "sensorsight=loud" } }"#);
        assert!(
            matches!(&result, Err(ConfigError::Validation(msg)) if msg.starts_with("logging.level")),
            "got {:?}",
            result
        );
    }

    #[test]
    fn test_malformed_json5() {
        let result = PollerAppConfig::from_json5("{ poller: ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
