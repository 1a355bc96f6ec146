use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A normalized snapshot of one sensor poll.
///
/// Temperature is always in degrees Celsius and pressure in hectopascals.
/// A quantity the sensor did not report is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Temperature in degrees Celsius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_celsius: Option<f64>,

    /// Relative humidity (0-100%).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity_percent: Option<f64>,

    /// Pressure in hPa.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure_hpa: Option<f64>,

    /// When the reading was produced.
    pub timestamp: DateTime<Utc>,
}

impl Reading {
    /// Create a reading with no quantities.
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            temperature_celsius: None,
            humidity_percent: None,
            pressure_hpa: None,
            timestamp,
        }
    }

    /// Get the value of a quantity, if present.
    pub fn get(&self, quantity: Quantity) -> Option<f64> {
        match quantity {
            Quantity::Temperature => self.temperature_celsius,
            Quantity::Humidity => self.humidity_percent,
            Quantity::Pressure => self.pressure_hpa,
        }
    }

    /// True if no quantity is present.
    pub fn is_empty(&self) -> bool {
        Quantity::ALL.iter().all(|q| self.get(*q).is_none())
    }

    /// Iterate over present quantities in temperature, humidity, pressure order.
    pub fn quantities(&self) -> impl Iterator<Item = (Quantity, f64)> + '_ {
        Quantity::ALL
            .iter()
            .filter_map(|q| self.get(*q).map(|v| (*q, v)))
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A physical quantity carried by a [`Reading`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantity {
    Temperature,
    Humidity,
    Pressure,
}

impl Quantity {
    /// All quantities, in delivery order.
    pub const ALL: [Quantity; 3] = [
        Quantity::Temperature,
        Quantity::Humidity,
        Quantity::Pressure,
    ];

    /// Lowercase name used in configuration and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Quantity::Temperature => "temperature",
            Quantity::Humidity => "humidity",
            Quantity::Pressure => "pressure",
        }
    }

    /// Notification event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            Quantity::Temperature => "TEMPERATURE",
            Quantity::Humidity => "HUMIDITY",
            Quantity::Pressure => "PRESSURE",
        }
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
