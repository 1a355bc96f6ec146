//! SensorSight Common Library
//!
//! This crate provides shared types and utilities for SensorSight pollers:
//!
//! - [`reading`] - Normalized sensor data model (`Reading`, `Quantity`)
//! - [`units`] - Temperature and pressure units and conversions
//! - [`config`] - Logging settings
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod reading;
pub mod units;

// Re-export commonly used types at the crate root
pub use config::{LogFormat, LoggingConfig};
pub use error::{Error, Result};
pub use reading::{Quantity, Reading};
pub use units::{PressureUnit, TemperatureUnit};

/// Initialize tracing with the given configuration.
///
/// `RUST_LOG` takes precedence over the configured level when it is set and
/// valid. Otherwise the configured level is used, and a malformed level is
/// reported as [`Error::Config`] rather than falling back silently.
///
/// `LogFormat::Json` emits one JSON object per event for log aggregation;
/// `LogFormat::Text` is the human-readable default.
///
/// # Example
///
/// ```ignore
/// use sensorsight_common::{LoggingConfig, init_tracing};
///
/// let config = LoggingConfig::default().with_level_override(Some("debug".into()));
/// init_tracing(&config)?;
/// ```
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => config.env_filter()?,
    };

    let layer = match config.format {
        LogFormat::Text => fmt::layer().boxed(),
        LogFormat::Json => fmt::layer().json().boxed(),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))
}
