//! Data model for stored sensor readings.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

// ---

/// Seconds a reading is retained before the store may purge it (90 days).
pub const TTL_SECONDS: i64 = 90 * 24 * 60 * 60;

/// Fields a client must supply, in the order they are reported when missing.
pub const REQUIRED_FIELDS: [&str; 4] = ["sensorId", "temperature", "humidity", "waterLevel"];

/// Validated client payload for `POST /sensors`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    // ---
    pub sensor_id: String,
    pub temperature: Decimal,
    pub humidity: Decimal,
    pub water_level: Decimal,
}

/// One immutable reading as persisted in the store and the archive.
///
/// Measurements are decimals and cross JSON as numbers without ever passing
/// through `f64`, so `25.5` is stored and returned as exactly `25.5`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    // ---
    pub sensor_id: String,
    pub timestamp: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub temperature: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub humidity: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub water_level: Decimal,
    pub ttl: i64,
}

impl NewReading {
    /// Parse and validate a raw request body.
    ///
    /// Fails with `MalformedBody` when the body is not a JSON object and with
    /// `MissingFields` naming every absent required field. Nothing is defaulted.
    pub fn parse(raw: &[u8]) -> Result<Self, ValidationError> {
        // ---
        let body: Map<String, Value> =
            serde_json::from_slice(raw).map_err(|_| ValidationError::MalformedBody)?;

        let missing: Vec<&'static str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| matches!(body.get(*field), None | Some(Value::Null)))
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let sensor_id = match &body["sensorId"] {
            Value::String(s) if is_valid_sensor_id(s) => s.clone(),
            _ => return Err(ValidationError::InvalidField("sensorId")),
        };

        Ok(NewReading {
            sensor_id,
            temperature: decimal_field(&body, "temperature")?,
            humidity: decimal_field(&body, "humidity")?,
            water_level: decimal_field(&body, "waterLevel")?,
        })
    }

    /// Stamp the reading with its server-side timestamp and expiry.
    pub fn stamp(self, now: DateTime<Utc>) -> SensorReading {
        // ---
        SensorReading {
            sensor_id: self.sensor_id,
            timestamp: format_timestamp(now),
            temperature: self.temperature,
            humidity: self.humidity,
            water_level: self.water_level,
            ttl: now.timestamp() + TTL_SECONDS,
        }
    }
}

impl SensorReading {
    /// Object key of the archived copy.
    pub fn archive_key(&self) -> String {
        format!("sensors/{}/{}.json", self.sensor_id, self.timestamp)
    }
}

/// Fixed-width RFC 3339 UTC with nanoseconds, so string order is time order.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// A sensor id becomes one segment of the archive key, so it must not be
/// able to add or climb path segments.
fn is_valid_sensor_id(id: &str) -> bool {
    !id.trim().is_empty() && !id.contains(['/', '\\']) && id != "." && id != ".."
}

/// Read a measurement from its original JSON text, never via `f64`.
///
/// Values `Decimal` cannot hold exactly (more than 28 significant digits)
/// are rejected rather than rounded.
fn decimal_field(body: &Map<String, Value>, field: &'static str) -> Result<Decimal, ValidationError> {
    // ---
    let text = match &body[field] {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return Err(ValidationError::InvalidField(field)),
    };

    let value = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| ValidationError::InvalidField(field))?;

    match (canonical_digits(&text), canonical_digits(&value.to_string())) {
        (Some(input), Some(parsed)) if input == parsed => Ok(value),
        _ => Err(ValidationError::InvalidField(field)),
    }
}

/// Reduce a decimal literal to `(negative, significant digits, exponent)`
/// so two spellings of the same value compare equal.
fn canonical_digits(text: &str) -> Option<(bool, String, i64)> {
    // ---
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (mantissa, mut exponent) = match unsigned.split_once(['e', 'E']) {
        Some((m, e)) => (m, e.parse::<i64>().ok()?),
        None => (unsigned, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let all_digits = format!("{int_part}{frac_part}");
    if all_digits.is_empty() || !all_digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    exponent -= frac_part.len() as i64;

    let trimmed = all_digits.trim_start_matches('0');
    if trimmed.is_empty() {
        return Some((false, "0".to_string(), 0));
    }
    let significant = trimmed.trim_end_matches('0');
    exponent += (trimmed.len() - significant.len()) as i64;

    Some((negative, significant.to_string(), exponent))
}
