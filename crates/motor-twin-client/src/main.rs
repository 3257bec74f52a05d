//! 3D digital twin of an electric motor using Bevy.
//!
//! Two copies of a motor model spin at a rate set either by the on-screen
//! slider or by sensor readings arriving over an MQTT subscription, with the
//! latest readings shown in a side panel.

mod async_runtime;
mod bus;
mod camera;
mod controller;
mod launch_params;
mod scene;
mod ui;

use async_runtime::AsyncRuntimePlugin;
use bevy::prelude::*;
use bus::BusPlugin;
use camera::OrbitCameraPlugin;
use controller::{ControllerPlugin, SpinClock};
use scene::ScenePlugin;
use ui::ControlPanelPlugin;

/// Plugin for the main application.
pub struct AppPlugin;

impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            ControllerPlugin,
            ScenePlugin,
            OrbitCameraPlugin,
            ControlPanelPlugin,
            BusPlugin,
        ));
    }
}

fn main() {
    // Initialize tracing for native platforms.
    #[cfg(not(target_family = "wasm"))]
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    // Initialize tracing for WASM (logs to browser console).
    #[cfg(target_family = "wasm")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    }

    let params = launch_params::parse();
    tracing::info!("Launch parameters: {params:?}");

    let mut app = App::new();

    #[allow(unused_mut)]
    let mut window = Window {
        title: "motor-twin".to_string(),
        resolution: (1280, 720).into(),
        ..Default::default()
    };

    // WASM: Fit canvas to parent element and prevent browser event handling.
    #[cfg(target_family = "wasm")]
    {
        window.fit_canvas_to_parent = true;
        window.prevent_default_event_handling = true;
    }

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(window),
        ..Default::default()
    }));

    // Add async runtime (Tokio on native, no-op on WASM).
    app.add_plugins(AsyncRuntimePlugin);

    app.insert_resource(SpinClock(params.frame_clock))
        .insert_resource(params)
        .add_plugins(AppPlugin)
        .run();
}
