//! Decoding of sensor payloads published on the message bus.
//!
//! Payloads are JSON objects in which every field is optional. Some channels
//! accept an alias: a per-phase name (`voltage_red`) is preferred and a plain
//! name (`voltage`) is the fallback. Aliases are resolved here, once, so the
//! rest of the crate only sees [`SensorReading`].

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::readout::Channel;

/// A single decoded sensor value.
///
/// Values are displayed as received, so text is kept alongside numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorValue {
    /// A JSON number.
    Number(f64),
    /// Any other non-null JSON value, in its textual form.
    Text(String),
}

impl SensorValue {
    /// Convert a JSON value, treating `null` as absent.
    fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Number(n) => n.as_f64().map(SensorValue::Number),
            Value::String(s) => Some(SensorValue::Text(s)),
            other => Some(SensorValue::Text(other.to_string())),
        }
    }

    /// Numeric interpretation, parsing text that holds a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SensorValue::Number(n) => Some(*n),
            SensorValue::Text(s) => s.trim().parse().ok().filter(|n: &f64| n.is_finite()),
        }
    }
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorValue::Number(n) => write!(f, "{n}"),
            SensorValue::Text(s) => f.write_str(s),
        }
    }
}

/// Wire layout of a payload, before aliases are resolved.
#[derive(Deserialize)]
struct RawReading {
    rpm: Option<Value>,
    voltage_red: Option<Value>,
    voltage: Option<Value>,
    current_red: Option<Value>,
    current: Option<Value>,
    motor_temperature: Option<Value>,
    pf_red: Option<Value>,
    vibration_x: Option<Value>,
    vibration_y: Option<Value>,
    vibration_z: Option<Value>,
}

/// A decoded payload with one optional value per channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorReading {
    pub rpm: Option<SensorValue>,
    pub voltage: Option<SensorValue>,
    pub current: Option<SensorValue>,
    pub temperature: Option<SensorValue>,
    pub power_factor: Option<SensorValue>,
    pub vibration_x: Option<SensorValue>,
    pub vibration_y: Option<SensorValue>,
    pub vibration_z: Option<SensorValue>,
}

impl SensorReading {
    /// Decode a raw payload.
    ///
    /// Fails if the bytes are not JSON or not a JSON object. Missing, `null`
    /// and unknown fields are not errors.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(payload)?;
        let found = match &value {
            Value::Object(_) => None,
            Value::Null => Some("null"),
            Value::Bool(_) => Some("a boolean"),
            Value::Number(_) => Some("a number"),
            Value::String(_) => Some("a string"),
            Value::Array(_) => Some("an array"),
        };
        if let Some(found) = found {
            return Err(Error::NotAnObject { found });
        }

        let raw: RawReading = serde_json::from_value(value)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawReading) -> Self {
        let pick = |value: Option<Value>| value.and_then(SensorValue::from_json);
        let prefer = |preferred: Option<Value>, fallback: Option<Value>| {
            pick(preferred).or_else(|| pick(fallback))
        };

        Self {
            rpm: pick(raw.rpm),
            voltage: prefer(raw.voltage_red, raw.voltage),
            current: prefer(raw.current_red, raw.current),
            temperature: pick(raw.motor_temperature),
            power_factor: pick(raw.pf_red),
            vibration_x: pick(raw.vibration_x),
            vibration_y: pick(raw.vibration_y),
            vibration_z: pick(raw.vibration_z),
        }
    }

    /// The value for a display channel, if the payload carried one.
    pub fn get(&self, channel: Channel) -> Option<&SensorValue> {
        match channel {
            Channel::Voltage => self.voltage.as_ref(),
            Channel::Current => self.current.as_ref(),
            Channel::Temperature => self.temperature.as_ref(),
            Channel::PowerFactor => self.power_factor.as_ref(),
            Channel::Rpm => self.rpm.as_ref(),
            Channel::VibrationX => self.vibration_x.as_ref(),
            Channel::VibrationY => self.vibration_y.as_ref(),
            Channel::VibrationZ => self.vibration_z.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_partial_payload() {
        let reading =
            SensorReading::decode(br#"{"rpm": 1200, "voltage": 230, "vibration_x": 0.02}"#)
                .unwrap();
        assert_eq!(reading.rpm, Some(SensorValue::Number(1200.0)));
        assert_eq!(reading.voltage, Some(SensorValue::Number(230.0)));
        assert_eq!(reading.vibration_x, Some(SensorValue::Number(0.02)));
        assert!(reading.current.is_none());
        assert!(reading.temperature.is_none());
        assert!(reading.power_factor.is_none());
    }

    #[test]
    fn test_decode_prefers_phase_alias() {
        let reading = SensorReading::decode(
            br#"{"voltage_red": 231.5, "voltage": 1, "current": 4.2, "current_red": null}"#,
        )
        .unwrap();
        assert_eq!(reading.voltage, Some(SensorValue::Number(231.5)));
        // A null preferred alias falls back to the plain name.
        assert_eq!(reading.current, Some(SensorValue::Number(4.2)));
    }

    #[test]
    fn test_decode_keeps_text_values() {
        let reading =
            SensorReading::decode(br#"{"motor_temperature": "hot", "pf_red": true}"#).unwrap();
        assert_eq!(reading.temperature, Some(SensorValue::Text("hot".into())));
        assert_eq!(reading.power_factor, Some(SensorValue::Text("true".into())));
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let reading = SensorReading::decode(br#"{"humidity": 40}"#).unwrap();
        assert_eq!(reading, SensorReading::default());
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(matches!(
            SensorReading::decode(b"{not json"),
            Err(Error::Payload { .. })
        ));
        assert!(matches!(
            SensorReading::decode(b"[1, 2]"),
            Err(Error::NotAnObject { found: "an array" })
        ));
    }

    #[test]
    fn test_value_as_f64() {
        assert_eq!(SensorValue::Number(3.5).as_f64(), Some(3.5));
        assert_eq!(SensorValue::Text(" 1500 ".into()).as_f64(), Some(1500.0));
        assert_eq!(SensorValue::Text("fast".into()).as_f64(), None);
        assert_eq!(SensorValue::Text("NaN".into()).as_f64(), None);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(SensorValue::Number(230.0).to_string(), "230");
        assert_eq!(SensorValue::Number(0.02).to_string(), "0.02");
        assert_eq!(SensorValue::Text("n/a".into()).to_string(), "n/a");
    }
}
