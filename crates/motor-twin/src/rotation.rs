//! Rotation rate and the per-frame angle step derived from it.

use std::f64::consts::TAU;

use crate::config::ASSUMED_FPS;

/// Highest rate the manual control accepts, in RPM.
pub const MAX_RPM: f64 = 3000.0;

/// [`MAX_RPM`] as a slider position.
pub const MAX_SLIDER_RPM: u32 = 3000;

/// Rotor speed in revolutions per minute, always within `[0, MAX_RPM]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct RotationRate(f64);

impl RotationRate {
    /// Stationary rotor.
    pub const ZERO: Self = Self(0.0);

    /// Build a rate, clamping into range. Non-finite input becomes zero.
    pub fn clamped(rpm: f64) -> Self {
        if rpm.is_finite() {
            Self(rpm.clamp(0.0, MAX_RPM))
        } else {
            Self::ZERO
        }
    }

    /// Revolutions per minute.
    pub fn rpm(self) -> f64 {
        self.0
    }

    /// Angular speed in radians per second.
    pub fn radians_per_second(self) -> f64 {
        self.0 * TAU / 60.0
    }
}

/// How the render loop measures a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameClock {
    /// Every frame is assumed to last `1 / fps` seconds.
    Assumed {
        /// Assumed display refresh rate.
        fps: f64,
    },
    /// Use the measured frame time.
    Elapsed,
}

impl Default for FrameClock {
    fn default() -> Self {
        FrameClock::Assumed { fps: ASSUMED_FPS }
    }
}

impl FrameClock {
    /// Rotation in radians to apply for one frame.
    ///
    /// `elapsed_secs` is only read by [`FrameClock::Elapsed`].
    pub fn step(self, rate: RotationRate, elapsed_secs: f64) -> f64 {
        match self {
            FrameClock::Assumed { fps } if fps > 0.0 => rate.radians_per_second() / fps,
            FrameClock::Assumed { .. } => 0.0,
            FrameClock::Elapsed => rate.radians_per_second() * elapsed_secs.max(0.0),
        }
    }
}

/// Wrap an angle into `[0, 2π)`.
pub fn normalize_angle(radians: f64) -> f64 {
    radians.rem_euclid(TAU)
}
