//! Controller state shared by the input handlers and the render loop.
//!
//! Three sources touch this state and each only touches what its mode
//! allows:
//!
//! - the slider writes the rotation rate, in [`Mode::Manual`] only
//! - bus messages write the rotation rate and readouts, in [`Mode::BusDriven`] only
//! - the render loop only reads the rotation rate

use crate::error::Result;
use crate::reading::SensorReading;
use crate::readout::Readouts;
use crate::rotation::{MAX_RPM, MAX_SLIDER_RPM, RotationRate};

/// Which source drives the rotation rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// The slider drives the rate; bus messages are ignored.
    #[default]
    Manual,
    /// Bus messages drive the rate and readouts; the slider is locked.
    BusDriven,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::Manual => "Manual Mode",
            Mode::BusDriven => "Node-RED Mode",
        }
    }
}

/// What happened to a bus message.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageOutcome {
    /// Mode was manual; the message was not decoded.
    Ignored,
    /// The reading was applied.
    Applied {
        /// Rate in force after the update.
        rate: RotationRate,
        /// Whether the payload's RPM fell outside `[0, MAX_RPM]`.
        clamped: bool,
    },
}

/// Complete state of the motor twin.
#[derive(Debug, Clone, Default)]
pub struct TwinState {
    rate: RotationRate,
    mode: Mode,
    slider: u32,
    readouts: Readouts,
}

impl TwinState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rate(&self) -> RotationRate {
        self.rate
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn readouts(&self) -> &Readouts {
        &self.readouts
    }

    /// Last position of the manual slider.
    pub fn slider(&self) -> u32 {
        self.slider
    }

    pub fn slider_enabled(&self) -> bool {
        self.mode == Mode::Manual
    }

    /// Label shown under the slider.
    pub fn slider_label(&self) -> String {
        format!("RPM: {}", self.slider)
    }

    /// Switch to manual control.
    ///
    /// The rate keeps whatever the bus last set until the slider moves.
    pub fn select_manual(&mut self) {
        if self.mode != Mode::Manual {
            tracing::info!("Switched to manual mode");
        }
        self.mode = Mode::Manual;
    }

    /// Switch to bus-driven control. The slider keeps its position.
    pub fn select_bus_driven(&mut self) {
        if self.mode != Mode::BusDriven {
            tracing::info!("Switched to bus-driven mode");
        }
        self.mode = Mode::BusDriven;
    }

    /// Apply a slider movement. Returns `false` if the slider is locked.
    pub fn slider_input(&mut self, rpm: u32) -> bool {
        if !self.slider_enabled() {
            return false;
        }
        self.slider = rpm.min(MAX_SLIDER_RPM);
        self.rate = RotationRate::clamped(f64::from(self.slider));
        true
    }

    /// Handle a raw bus payload.
    ///
    /// In manual mode the payload is dropped without decoding. A payload that
    /// fails to decode leaves the state untouched.
    pub fn apply_message(&mut self, payload: &[u8]) -> Result<MessageOutcome> {
        if self.mode != Mode::BusDriven {
            return Ok(MessageOutcome::Ignored);
        }
        let reading = SensorReading::decode(payload)?;
        Ok(self.apply_reading(&reading))
    }

    /// Apply an already decoded reading.
    pub fn apply_reading(&mut self, reading: &SensorReading) -> MessageOutcome {
        if self.mode != Mode::BusDriven {
            return MessageOutcome::Ignored;
        }

        let mut clamped = false;
        if let Some(rpm) = reading.rpm.as_ref().and_then(|v| v.as_f64()) {
            self.rate = RotationRate::clamped(rpm);
            clamped = self.rate.rpm() != rpm;
            if clamped {
                tracing::warn!(
                    "Bus RPM {rpm} outside 0..={MAX_RPM}, using {}",
                    self.rate.rpm()
                );
            }
        }

        self.readouts.apply(reading);
        MessageOutcome::Applied {
            rate: self.rate,
            clamped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readout::{Channel, PLACEHOLDER};

    fn bus_driven() -> TwinState {
        let mut state = TwinState::new();
        state.select_bus_driven();
        state
    }

    #[test]
    fn test_initial_state() {
        let state = TwinState::new();
        assert_eq!(state.mode(), Mode::Manual);
        assert_eq!(state.rate(), RotationRate::ZERO);
        assert!(state.slider_enabled());
        assert_eq!(state.slider_label(), "RPM: 0");
    }

    #[test]
    fn test_mode_button_labels() {
        assert_eq!(Mode::Manual.label(), "Manual Mode");
        assert_eq!(Mode::BusDriven.label(), "Node-RED Mode");
    }

    #[test]
    fn test_slider_in_manual_mode() {
        let mut state = TwinState::new();
        assert!(state.slider_input(1500));
        assert_eq!(state.rate().rpm(), 1500.0);
        assert_eq!(state.slider_label(), "RPM: 1500");

        assert!(state.slider_input(5000));
        assert_eq!(state.slider(), 3000);
        assert_eq!(state.rate().rpm(), 3000.0);
    }

    #[test]
    fn test_slider_locked_in_bus_mode() {
        let mut state = TwinState::new();
        assert!(state.slider_input(1500));
        state.select_bus_driven();

        assert!(!state.slider_enabled());
        assert!(!state.slider_input(200));
        assert_eq!(state.rate().rpm(), 1500.0);
        assert_eq!(state.slider(), 1500);
    }

    #[test]
    fn test_decode_example_payload() {
        let mut state = bus_driven();
        let outcome = state
            .apply_message(br#"{"rpm": 1200, "voltage": 230, "vibration_x": 0.02}"#)
            .unwrap();

        assert_eq!(
            outcome,
            MessageOutcome::Applied {
                rate: RotationRate::clamped(1200.0),
                clamped: false
            }
        );
        assert_eq!(state.rate().rpm(), 1200.0);
        let readouts = state.readouts();
        assert_eq!(readouts.get(Channel::Voltage), "230 V");
        assert_eq!(readouts.get(Channel::VibrationX), "0.02 g");
        assert_eq!(readouts.get(Channel::Rpm), "1200");
        for channel in [
            Channel::Current,
            Channel::Temperature,
            Channel::PowerFactor,
            Channel::VibrationY,
            Channel::VibrationZ,
        ] {
            assert_eq!(readouts.get(channel), PLACEHOLDER);
        }
    }

    #[test]
    fn test_manual_mode_ignores_messages() {
        let mut state = TwinState::new();
        state.slider_input(700);
        let before = state.clone();

        let outcome = state
            .apply_message(br#"{"rpm": 2500, "voltage": 400}"#)
            .unwrap();
        assert_eq!(outcome, MessageOutcome::Ignored);
        assert_eq!(state.rate(), before.rate());
        assert_eq!(state.readouts(), before.readouts());

        // Malformed payloads are not even decoded in manual mode.
        assert_eq!(
            state.apply_message(b"garbage").unwrap(),
            MessageOutcome::Ignored
        );
    }

    #[test]
    fn test_switch_to_manual_before_message_wins() {
        let mut state = bus_driven();
        state.apply_message(br#"{"rpm": 1000}"#).unwrap();

        // Switch lands before the next message is handled.
        state.select_manual();
        let outcome = state.apply_message(br#"{"rpm": 2000}"#).unwrap();
        assert_eq!(outcome, MessageOutcome::Ignored);
        assert_eq!(state.rate().rpm(), 1000.0);
    }

    #[test]
    fn test_manual_keeps_last_bus_rate() {
        let mut state = TwinState::new();
        state.slider_input(300);
        state.select_bus_driven();
        state.apply_message(br#"{"rpm": 1800}"#).unwrap();

        state.select_manual();
        assert_eq!(state.rate().rpm(), 1800.0);
        assert_eq!(state.slider(), 300);

        state.slider_input(400);
        assert_eq!(state.rate().rpm(), 400.0);
    }

    #[test]
    fn test_malformed_message_leaves_state() {
        let mut state = bus_driven();
        state
            .apply_message(br#"{"rpm": 900, "current": 3}"#)
            .unwrap();
        let before = state.clone();

        assert!(state.apply_message(b"{\"rpm\": ").is_err());
        assert_eq!(state.rate(), before.rate());
        assert_eq!(state.readouts(), before.readouts());

        // Later messages still apply.
        state.apply_message(br#"{"rpm": 950}"#).unwrap();
        assert_eq!(state.rate().rpm(), 950.0);
    }

    #[test]
    fn test_bus_rpm_is_clamped() {
        let mut state = bus_driven();
        let outcome = state.apply_message(br#"{"rpm": 4200}"#).unwrap();
        assert_eq!(
            outcome,
            MessageOutcome::Applied {
                rate: RotationRate::clamped(MAX_RPM),
                clamped: true
            }
        );
        // The readout still shows what the sensor reported.
        assert_eq!(state.readouts().get(Channel::Rpm), "4200");
    }

    #[test]
    fn test_missing_rpm_keeps_rate() {
        let mut state = bus_driven();
        state.apply_message(br#"{"rpm": 1100}"#).unwrap();
        state.apply_message(br#"{"voltage": 229}"#).unwrap();
        assert_eq!(state.rate().rpm(), 1100.0);
        assert_eq!(state.readouts().get(Channel::Rpm), PLACEHOLDER);
    }

    #[test]
    fn test_textual_rpm_is_parsed() {
        let mut state = bus_driven();
        state.apply_message(br#"{"rpm": "1350"}"#).unwrap();
        assert_eq!(state.rate().rpm(), 1350.0);
    }
}
