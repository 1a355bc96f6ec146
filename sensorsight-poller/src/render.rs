//! Log-based renderer for poll outcomes.

use sensorsight_common::Reading;
use tracing::{info, warn};

use crate::display::DisplayFormatter;
use crate::poller::{Deliver, PollOutcome};

/// Renders every poll outcome as a log line.
///
/// Keeps the last good reading so an error can be shown next to the data
/// the user last saw.
#[derive(Debug)]
pub struct LogRenderer {
    formatter: DisplayFormatter,
    last_good: Option<Reading>,
}

impl LogRenderer {
    pub fn new(formatter: DisplayFormatter) -> Self {
        Self {
            formatter,
            last_good: None,
        }
    }

    pub fn last_good(&self) -> Option<&Reading> {
        self.last_good.as_ref()
    }

    /// Text shown for an outcome.
    pub fn render(&self, outcome: &PollOutcome) -> String {
        let title = self.formatter.title();
        let body = match outcome {
            Ok(reading) => self.formatter.summary(reading),
            Err(e) => match &self.last_good {
                Some(reading) => format!(
                    "error: {} (last: {})",
                    e,
                    self.formatter.summary(reading)
                ),
                None => format!("error: {}", e),
            },
        };

        match title {
            Some(title) => format!("{}: {}", title, body),
            None => body,
        }
    }
}

impl Deliver for LogRenderer {
    fn deliver(&mut self, outcome: PollOutcome) {
        let text = self.render(&outcome);
        match outcome {
            Ok(reading) => {
                info!(timestamp = %reading.timestamp, "{}", text);
                self.last_good = Some(reading);
            }
            Err(e) => {
                warn!(kind = e.kind(), "{}", text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisplayConfig;
    use crate::fetcher::FetchError;
    use chrono::Utc;
    use sensorsight_common::{PressureUnit, TemperatureUnit};

    fn renderer() -> LogRenderer {
        LogRenderer::new(DisplayFormatter::new(
            DisplayConfig::default(),
            TemperatureUnit::C,
            PressureUnit::Hpa,
        ))
    }

    fn reading(temperature: f64) -> Reading {
        Reading {
            temperature_celsius: Some(temperature),
            humidity_percent: None,
            pressure_hpa: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_error_before_any_reading() {
        let renderer = renderer();
        assert_eq!(
            renderer.render(&Err(FetchError::Http(500))),
            "Weather: error: HTTP error: 500"
        );
    }

    #[test]
    fn test_last_good_reading_preserved() {
        let mut renderer = renderer();

        renderer.deliver(Ok(reading(21.0)));
        renderer.deliver(Err(FetchError::Timeout));

        assert_eq!(renderer.last_good().unwrap().temperature_celsius, Some(21.0));
        assert_eq!(
            renderer.render(&Err(FetchError::Timeout)),
            "Weather: error: Request timed out (last: temperature=21.0°C)"
        );

        renderer.deliver(Ok(reading(22.0)));
        assert_eq!(renderer.last_good().unwrap().temperature_celsius, Some(22.0));
    }
}
