//! Read-only display fields for the eight sensor channels.

use crate::reading::SensorReading;

/// Text shown for a channel the last payload did not carry.
pub const PLACEHOLDER: &str = "--";

/// A sensor channel with a fixed display slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Voltage,
    Current,
    Temperature,
    PowerFactor,
    Rpm,
    VibrationX,
    VibrationY,
    VibrationZ,
}

impl Channel {
    /// All channels in display order.
    pub const ALL: [Channel; 8] = [
        Channel::Voltage,
        Channel::Current,
        Channel::Temperature,
        Channel::PowerFactor,
        Channel::Rpm,
        Channel::VibrationX,
        Channel::VibrationY,
        Channel::VibrationZ,
    ];

    /// Stable key for the channel.
    pub fn key(self) -> &'static str {
        match self {
            Channel::Voltage => "voltage",
            Channel::Current => "current",
            Channel::Temperature => "temperature",
            Channel::PowerFactor => "power_factor",
            Channel::Rpm => "rpm",
            Channel::VibrationX => "vibration_x",
            Channel::VibrationY => "vibration_y",
            Channel::VibrationZ => "vibration_z",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Channel::Voltage => "Voltage",
            Channel::Current => "Current",
            Channel::Temperature => "Temperature",
            Channel::PowerFactor => "Power Factor",
            Channel::Rpm => "RPM",
            Channel::VibrationX => "Vibration X",
            Channel::VibrationY => "Vibration Y",
            Channel::VibrationZ => "Vibration Z",
        }
    }

    /// Unit suffix, if the channel has one.
    pub fn unit(self) -> Option<&'static str> {
        match self {
            Channel::Voltage => Some("V"),
            Channel::Current => Some("A"),
            Channel::Temperature => Some("°C"),
            Channel::PowerFactor | Channel::Rpm => None,
            Channel::VibrationX | Channel::VibrationY | Channel::VibrationZ => Some("g"),
        }
    }

    fn index(self) -> usize {
        match self {
            Channel::Voltage => 0,
            Channel::Current => 1,
            Channel::Temperature => 2,
            Channel::PowerFactor => 3,
            Channel::Rpm => 4,
            Channel::VibrationX => 5,
            Channel::VibrationY => 6,
            Channel::VibrationZ => 7,
        }
    }
}

/// Current display text of every channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readouts {
    values: [String; 8],
}

impl Default for Readouts {
    fn default() -> Self {
        Self {
            values: std::array::from_fn(|_| PLACEHOLDER.to_string()),
        }
    }
}

impl Readouts {
    /// Display text for a channel.
    pub fn get(&self, channel: Channel) -> &str {
        &self.values[channel.index()]
    }

    /// Overwrite every channel from a reading.
    ///
    /// Channels the reading lacks are reset to the placeholder rather than
    /// keeping their previous value.
    pub fn apply(&mut self, reading: &SensorReading) {
        for channel in Channel::ALL {
            self.values[channel.index()] = match (reading.get(channel), channel.unit()) {
                (Some(value), Some(unit)) => format!("{value} {unit}"),
                (Some(value), None) => value.to_string(),
                (None, _) => PLACEHOLDER.to_string(),
            };
        }
    }

    /// Channels paired with their display text, in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, &str)> {
        Channel::ALL.into_iter().map(|c| (c, self.get(c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::SensorValue;

    #[test]
    fn test_readouts_start_as_placeholder() {
        let readouts = Readouts::default();
        assert!(readouts.iter().all(|(_, text)| text == PLACEHOLDER));
        assert_eq!(readouts.iter().count(), 8);
    }

    #[test]
    fn test_apply_formats_units() {
        let mut readouts = Readouts::default();
        readouts.apply(&SensorReading {
            rpm: Some(SensorValue::Number(1450.0)),
            voltage: Some(SensorValue::Number(230.0)),
            current: Some(SensorValue::Number(4.5)),
            temperature: Some(SensorValue::Number(61.2)),
            power_factor: Some(SensorValue::Number(0.92)),
            vibration_x: Some(SensorValue::Number(0.02)),
            vibration_y: Some(SensorValue::Text("0.03".into())),
            vibration_z: None,
        });

        assert_eq!(readouts.get(Channel::Voltage), "230 V");
        assert_eq!(readouts.get(Channel::Current), "4.5 A");
        assert_eq!(readouts.get(Channel::Temperature), "61.2 °C");
        assert_eq!(readouts.get(Channel::PowerFactor), "0.92");
        assert_eq!(readouts.get(Channel::Rpm), "1450");
        assert_eq!(readouts.get(Channel::VibrationX), "0.02 g");
        assert_eq!(readouts.get(Channel::VibrationY), "0.03 g");
        assert_eq!(readouts.get(Channel::VibrationZ), PLACEHOLDER);
    }

    #[test]
    fn test_missing_field_resets_prior_value() {
        let mut readouts = Readouts::default();
        readouts.apply(&SensorReading {
            voltage: Some(SensorValue::Number(230.0)),
            ..SensorReading::default()
        });
        assert_eq!(readouts.get(Channel::Voltage), "230 V");

        readouts.apply(&SensorReading::default());
        assert_eq!(readouts.get(Channel::Voltage), PLACEHOLDER);
    }

    #[test]
    fn test_channel_keys_are_unique() {
        let mut keys: Vec<_> = Channel::ALL.iter().map(|c| c.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), Channel::ALL.len());
    }
}
