//! Render-time formatting of readings.
//!
//! Readings are stored in °C and hPa; conversion to the configured display
//! units happens here, never in the stored value.

use sensorsight_common::{PressureUnit, Quantity, Reading, TemperatureUnit};

use crate::config::{DisplayConfig, PollConfig};

/// Placeholder for a quantity the sensor did not report.
pub const MISSING: &str = "--";

/// Formats readings for display.
#[derive(Debug, Clone)]
pub struct DisplayFormatter {
    config: DisplayConfig,
    temperature_unit: TemperatureUnit,
    pressure_unit: PressureUnit,
}

impl DisplayFormatter {
    pub fn new(
        config: DisplayConfig,
        temperature_unit: TemperatureUnit,
        pressure_unit: PressureUnit,
    ) -> Self {
        Self {
            config,
            temperature_unit,
            pressure_unit,
        }
    }

    /// Create a formatter using the display units of `poll`.
    pub fn from_config(display: &DisplayConfig, poll: &PollConfig) -> Self {
        Self::new(display.clone(), poll.temperature_unit, poll.pressure_unit)
    }

    pub fn title(&self) -> Option<&str> {
        Some(self.config.title.as_str()).filter(|t| !t.is_empty())
    }

    /// Format a Celsius temperature in the display unit, without symbol.
    pub fn format_temperature(&self, celsius: Option<f64>) -> String {
        self.format_number(celsius.map(|c| self.temperature_unit.convert_from_celsius(c)))
    }

    pub fn format_humidity(&self, percent: Option<f64>) -> String {
        self.format_number(percent)
    }

    /// Format a hPa pressure in the display unit, without symbol.
    pub fn format_pressure(&self, hpa: Option<f64>) -> String {
        self.format_number(hpa.map(|p| self.pressure_unit.convert_from_hpa(p)))
    }

    pub fn symbol(&self, quantity: Quantity) -> &'static str {
        match quantity {
            Quantity::Temperature => self.temperature_unit.symbol(),
            Quantity::Humidity => "%",
            Quantity::Pressure => self.pressure_unit.symbol(),
        }
    }

    /// Whether a quantity is enabled for display.
    pub fn shows(&self, quantity: Quantity) -> bool {
        match quantity {
            Quantity::Temperature => self.config.show_temperature,
            Quantity::Humidity => self.config.show_humidity,
            Quantity::Pressure => self.config.show_pressure,
        }
    }

    /// Value with unit, e.g. `21.5°C`, or `--` when absent.
    pub fn format_quantity(&self, reading: &Reading, quantity: Quantity) -> String {
        let value = reading.get(quantity);
        let text = match quantity {
            Quantity::Temperature => self.format_temperature(value),
            Quantity::Humidity => self.format_humidity(value),
            Quantity::Pressure => self.format_pressure(value),
        };
        if value.is_some() {
            format!("{}{}", text, self.symbol(quantity))
        } else {
            text
        }
    }

    /// One-line summary of the shown, present quantities.
    ///
    /// ```text
    /// temperature=21.5°C humidity=40.0%
    /// ```
    pub fn summary(&self, reading: &Reading) -> String {
        let parts: Vec<String> = reading
            .quantities()
            .filter(|(quantity, _)| self.shows(*quantity))
            .map(|(quantity, _)| format!("{}={}", quantity, self.format_quantity(reading, quantity)))
            .collect();

        if parts.is_empty() {
            "no data".to_string()
        } else {
            parts.join(" ")
        }
    }

    fn format_number(&self, value: Option<f64>) -> String {
        match value {
            Some(v) => format!("{:.*}", self.config.decimals, v),
            None => MISSING.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn formatter(t: TemperatureUnit, p: PressureUnit) -> DisplayFormatter {
        DisplayFormatter::new(DisplayConfig::default(), t, p)
    }

    #[test]
    fn test_format_temperature() {
        let c = formatter(TemperatureUnit::C, PressureUnit::Hpa);
        assert_eq!(c.format_temperature(Some(21.54)), "21.5");
        assert_eq!(c.format_temperature(None), "--");

        let f = formatter(TemperatureUnit::F, PressureUnit::Hpa);
        assert_eq!(f.format_temperature(Some(20.0)), "68.0");
    }

    #[test]
    fn test_format_pressure() {
        let hpa = formatter(TemperatureUnit::C, PressureUnit::Hpa);
        assert_eq!(hpa.format_pressure(Some(1013.0)), "1013.0");

        let mmhg = formatter(TemperatureUnit::C, PressureUnit::MmHg);
        assert_eq!(mmhg.format_pressure(Some(1013.25)), "760.0");
        assert_eq!(mmhg.format_pressure(None), "--");
    }

    #[test]
    fn test_decimals() {
        let config = DisplayConfig {
            decimals: 0,
            ..DisplayConfig::default()
        };
        let formatter = DisplayFormatter::new(config, TemperatureUnit::C, PressureUnit::Hpa);
        assert_eq!(formatter.format_humidity(Some(55.5)), "56");
    }

    #[test]
    fn test_summary_respects_visibility() {
        let reading = Reading {
            temperature_celsius: Some(21.5),
            humidity_percent: Some(40.0),
            pressure_hpa: Some(1013.0),
            timestamp: Utc::now(),
        };

        let formatter = formatter(TemperatureUnit::C, PressureUnit::Hpa);
        // Pressure is hidden by default
        assert_eq!(
            formatter.summary(&reading),
            "temperature=21.5°C humidity=40.0%"
        );

        let all = DisplayFormatter::new(
            DisplayConfig {
                show_pressure: true,
                ..DisplayConfig::default()
            },
            TemperatureUnit::C,
            PressureUnit::Hpa,
        );
        assert_eq!(
            all.summary(&reading),
            "temperature=21.5°C humidity=40.0% pressure=1013.0 hPa"
        );

        assert_eq!(formatter.summary(&Reading::empty(Utc::now())), "no data");
    }

    #[test]
    fn test_title() {
        assert_eq!(
            formatter(TemperatureUnit::C, PressureUnit::Hpa).title(),
            Some("Weather")
        );

        let untitled = DisplayFormatter::new(
            DisplayConfig {
                title: String::new(),
                ..DisplayConfig::default()
            },
            TemperatureUnit::C,
            PressureUnit::Hpa,
        );
        assert_eq!(untitled.title(), None);
    }
}
