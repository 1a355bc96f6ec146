//! Mapping of arbitrary sensor JSON to a canonical [`Reading`].

use chrono::{DateTime, Utc};
use sensorsight_common::units::fahrenheit_to_celsius;
use sensorsight_common::{Quantity, Reading, TemperatureUnit};
use serde_json::{Map, Value};

use crate::config::PollConfig;

/// Normalize a sensor response, stamped with the current time.
pub fn normalize(json: &Value, config: &PollConfig) -> Reading {
    normalize_at(json, config, Utc::now())
}

/// Normalize a sensor response with an explicit timestamp.
///
/// For each quantity the first alias that is present and non-null wins.
/// Missing or unparsable values come back as `None`; this never fails.
/// A document that is not a JSON object yields an empty reading.
pub fn normalize_at(json: &Value, config: &PollConfig, timestamp: DateTime<Utc>) -> Reading {
    let Some(object) = json.as_object() else {
        return Reading::empty(timestamp);
    };

    let aliases = &config.field_aliases;
    let lookup = |quantity: Quantity| {
        first_present(object, aliases.for_quantity(quantity)).and_then(parse_number)
    };

    Reading {
        temperature_celsius: lookup(Quantity::Temperature)
            .map(|raw| to_celsius(raw, config.temperature_unit)),
        humidity_percent: lookup(Quantity::Humidity),
        pressure_hpa: lookup(Quantity::Pressure),
        timestamp,
    }
}

fn first_present<'a>(object: &'a Map<String, Value>, aliases: &[String]) -> Option<&'a Value> {
    aliases
        .iter()
        .find_map(|alias| object.get(alias).filter(|value| !value.is_null()))
}

/// Interpret a raw temperature as Celsius.
///
/// Sensors do not report their unit, so with a Celsius display unit any
/// value above 100 is taken to be Fahrenheit. Known defect: a genuine
/// reading above 100 °C is misread.
fn to_celsius(raw: f64, unit: TemperatureUnit) -> f64 {
    if unit == TemperatureUnit::C && raw > 100.0 {
        fahrenheit_to_celsius(raw)
    } else {
        raw
    }
}

/// Parse a JSON value as a finite float.
///
/// Numbers are taken as is; strings use their leading decimal number
/// (`"21.5C"` is 21.5). Anything else is `None`.
pub fn parse_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_leading_float(s),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = match bytes.first() {
        Some(b'+') | Some(b'-') => 1,
        _ => 0,
    };
    let int_start = end;
    end = digits_from(end);
    let mut has_digits = end > int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        if frac_end > end + 1 {
            end = frac_end;
            has_digits = true;
        }
    }

    if !has_digits {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}
