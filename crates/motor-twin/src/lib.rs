//! Engine-independent core of the electric motor digital twin.
//!
//! This crate owns everything about the twin that is not rendering or
//! networking: the controller state and its update rules, decoding of sensor
//! payloads, readout formatting, and the rotation step applied each frame.
//!
//! # Example
//!
//! ```
//! use motor_twin::{Channel, TwinState};
//!
//! let mut twin = TwinState::new();
//! twin.select_bus_driven();
//! twin.apply_message(br#"{"rpm": 1200, "voltage": 230}"#)?;
//!
//! assert_eq!(twin.rate().rpm(), 1200.0);
//! assert_eq!(twin.readouts().get(Channel::Voltage), "230 V");
//! # Ok::<(), motor_twin::Error>(())
//! ```

pub mod config;
mod error;
pub mod parts;
pub mod reading;
pub mod readout;
pub mod rotation;
mod twin;

pub use error::{Error, Result};
pub use parts::{PartAllowList, Placement};
pub use reading::{SensorReading, SensorValue};
pub use readout::{Channel, PLACEHOLDER, Readouts};
pub use rotation::{FrameClock, MAX_RPM, MAX_SLIDER_RPM, RotationRate};
pub use twin::{MessageOutcome, Mode, TwinState};
