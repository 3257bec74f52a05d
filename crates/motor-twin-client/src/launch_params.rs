//! Launch parameter parsing for the twin.
//!
//! On native, parameters are parsed from command-line arguments using clap.
//! On WASM, defaults are used (CLI argument parsing is not available).

use bevy::prelude::*;
use motor_twin::config::{self, BusConfig};
use motor_twin::{FrameClock, PartAllowList};

/// Launch parameters for the twin.
#[derive(Resource, Debug, Clone)]
pub struct LaunchParams {
    /// Message bus endpoint and topic.
    pub bus: BusConfig,
    /// Model file, relative to the asset directory.
    pub model_path: String,
    /// Mesh node names that spin.
    pub rotating_parts: PartAllowList,
    /// How the render loop measures frame time.
    pub frame_clock: FrameClock,
}

impl Default for LaunchParams {
    fn default() -> Self {
        Self {
            bus: BusConfig::with_client_id(config::client_id(rand::random())),
            model_path: config::DEFAULT_MODEL_PATH.to_string(),
            rotating_parts: PartAllowList::default(),
            frame_clock: FrameClock::default(),
        }
    }
}

#[cfg(not(target_family = "wasm"))]
mod native {
    use clap::{Parser, ValueEnum};

    use super::*;

    #[derive(Clone, Copy, Debug, ValueEnum)]
    enum ClockArg {
        /// Assume a fixed display refresh rate.
        Assumed,
        /// Use the measured frame time.
        Elapsed,
    }

    #[derive(Parser)]
    #[command(about = "3D digital twin of an electric motor")]
    struct CliArgs {
        /// WebSocket URL of the MQTT broker.
        #[arg(long, default_value = config::DEFAULT_BROKER_URL)]
        broker_url: String,

        /// Topic carrying sensor readings.
        #[arg(long, default_value = config::DEFAULT_TOPIC)]
        topic: String,

        /// MQTT client id (random if omitted).
        #[arg(long)]
        client_id: Option<String>,

        /// Model file, relative to the asset directory.
        #[arg(long, default_value = config::DEFAULT_MODEL_PATH)]
        model: String,

        /// Mesh node name that spins (repeatable).
        #[arg(long = "rotating-part", default_values = config::DEFAULT_ROTATING_PARTS)]
        rotating_parts: Vec<String>,

        /// How frame time is measured for the rotation step.
        #[arg(long, value_enum, default_value_t = ClockArg::Assumed)]
        frame_clock: ClockArg,

        /// Refresh rate assumed by the `assumed` frame clock.
        #[arg(long, default_value_t = config::ASSUMED_FPS)]
        assumed_fps: f64,
    }

    pub fn parse() -> LaunchParams {
        let args = CliArgs::parse();
        let client_id = args
            .client_id
            .unwrap_or_else(|| config::client_id(rand::random()));
        LaunchParams {
            bus: BusConfig {
                broker_url: args.broker_url,
                topic: args.topic,
                client_id,
            },
            model_path: args.model,
            rotating_parts: PartAllowList::new(&args.rotating_parts),
            frame_clock: match args.frame_clock {
                ClockArg::Assumed => FrameClock::Assumed {
                    fps: args.assumed_fps,
                },
                ClockArg::Elapsed => FrameClock::Elapsed,
            },
        }
    }
}

/// Parse launch parameters from CLI args (native) or use defaults (WASM).
pub fn parse() -> LaunchParams {
    #[cfg(not(target_family = "wasm"))]
    {
        native::parse()
    }
    #[cfg(target_family = "wasm")]
    {
        LaunchParams::default()
    }
}
