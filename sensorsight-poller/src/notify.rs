//! Named notification events for successful readings.

use sensorsight_common::{Quantity, Reading};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::info;

/// One event per present quantity of a successful poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    /// Event name, e.g. `TEMPERATURE` or `DHT_TEMPERATURE` with a prefix.
    pub name: String,
    pub quantity: Quantity,
    /// Normalized value (°C, %, hPa).
    pub value: f64,
}

/// Receiver of notification events.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: &Notification);
}

impl<F> NotificationSink for F
where
    F: Fn(&Notification) + Send + Sync,
{
    fn notify(&self, notification: &Notification) {
        self(notification)
    }
}

/// Logs every event at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: &Notification) {
        info!(
            event = %notification.name,
            value = notification.value,
            "Sensor notification"
        );
    }
}

/// Forwards events into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<Notification>) -> Self {
        Self { tx }
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, notification: &Notification) {
        // A closed receiver just means nobody is listening anymore
        let _ = self.tx.send(notification.clone());
    }
}

/// Build the events for a reading, in temperature, humidity, pressure order.
pub fn notifications_for(reading: &Reading, prefix: &str) -> Vec<Notification> {
    reading
        .quantities()
        .map(|(quantity, value)| Notification {
            name: format!("{}{}", prefix, quantity.event_name()),
            quantity,
            value,
        })
        .collect()
}

/// Emits notification events for successful readings to a sink.
pub struct Notifier {
    prefix: String,
    sink: Box<dyn NotificationSink>,
}

impl Notifier {
    pub fn new(prefix: impl Into<String>, sink: impl NotificationSink + 'static) -> Self {
        Self {
            prefix: prefix.into(),
            sink: Box::new(sink),
        }
    }

    /// Emit one event per present quantity. Returns the number emitted.
    pub fn emit(&self, reading: &Reading) -> usize {
        let notifications = notifications_for(reading, &self.prefix);
        for notification in &notifications {
            self.sink.notify(notification);
        }
        notifications.len()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    fn reading(t: Option<f64>, h: Option<f64>, p: Option<f64>) -> Reading {
        Reading {
            temperature_celsius: t,
            humidity_percent: h,
            pressure_hpa: p,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_events_for_present_quantities_only() {
        let events = notifications_for(&reading(None, Some(55.5), Some(1013.0)), "");

        let names: Vec<_> = events.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["HUMIDITY", "PRESSURE"]);
        assert_eq!(events[0].value, 55.5);
        assert_eq!(events[1].quantity, Quantity::Pressure);
    }

    #[test]
    fn test_prefixed_names() {
        let events = notifications_for(&reading(Some(21.0), None, None), "DHT_");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "DHT_TEMPERATURE");
    }

    #[test]
    fn test_empty_reading_emits_nothing() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();
        let notifier = Notifier::new("", move |n: &Notification| {
            sink_seen.lock().unwrap().push(n.name.clone());
        });

        assert_eq!(notifier.emit(&reading(None, None, None)), 0);
        assert!(seen.lock().unwrap().is_empty());

        assert_eq!(notifier.emit(&reading(Some(1.0), Some(2.0), Some(3.0))), 3);
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["TEMPERATURE", "HUMIDITY", "PRESSURE"]
        );
    }

    #[test]
    fn test_channel_sink() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let notifier = Notifier::new("", ChannelSink::new(tx));

        notifier.emit(&reading(Some(20.0), None, None));

        let event = rx.try_recv().unwrap();
        assert_eq!(event.name, "TEMPERATURE");
        assert_eq!(event.value, 20.0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_sink_closed_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let notifier = Notifier::new("", ChannelSink::new(tx));

        // Must not panic
        assert_eq!(notifier.emit(&reading(Some(20.0), None, None)), 1);
    }
}
