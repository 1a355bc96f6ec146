//! Measurement units and conversions.
//!
//! Readings are always stored in Celsius and hectopascals; the units here
//! select how they are interpreted on input and shown on output.

use serde::{Deserialize, Serialize};

/// Millimetres of mercury per hectopascal.
pub const MMHG_PER_HPA: f64 = 0.750062;

/// Temperature unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemperatureUnit {
    /// Degrees Celsius (default).
    #[default]
    C,
    /// Degrees Fahrenheit.
    F,
}

impl TemperatureUnit {
    /// Unit symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::C => "°C",
            TemperatureUnit::F => "°F",
        }
    }

    /// Convert a Celsius value into this unit.
    pub fn convert_from_celsius(&self, celsius: f64) -> f64 {
        match self {
            TemperatureUnit::C => celsius,
            TemperatureUnit::F => celsius_to_fahrenheit(celsius),
        }
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemperatureUnit::C => write!(f, "C"),
            TemperatureUnit::F => write!(f, "F"),
        }
    }
}

/// Pressure unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PressureUnit {
    /// Hectopascals (default).
    #[default]
    #[serde(rename = "hPa")]
    Hpa,
    /// Millimetres of mercury.
    #[serde(rename = "mmHg")]
    MmHg,
}

impl PressureUnit {
    /// Unit symbol for display, including the leading space.
    pub fn symbol(&self) -> &'static str {
        match self {
            PressureUnit::Hpa => " hPa",
            PressureUnit::MmHg => " mmHg",
        }
    }

    /// Convert a hectopascal value into this unit.
    pub fn convert_from_hpa(&self, hpa: f64) -> f64 {
        match self {
            PressureUnit::Hpa => hpa,
            PressureUnit::MmHg => hpa_to_mmhg(hpa),
        }
    }
}

impl std::fmt::Display for PressureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PressureUnit::Hpa => write!(f, "hPa"),
            PressureUnit::MmHg => write!(f, "mmHg"),
        }
    }
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn hpa_to_mmhg(hpa: f64) -> f64 {
    hpa * MMHG_PER_HPA
}
