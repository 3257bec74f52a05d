//! Message bus subscriber.
//!
//! A background task owns the broker connection and forwards everything it
//! sees as [`BusEvent`]s over a platform-agnostic `async_channel`. A frame
//! system drains the channel and feeds payloads to the twin, which decides
//! based on its mode whether they apply.
//!
//! - Native: `rumqttc` over secure WebSocket on the Tokio runtime
//! - WASM: the browser `WebSocket` with the `mqttrs` packet codec

// Used by the browser transport; built on every target.
#[cfg_attr(not(target_family = "wasm"), allow(dead_code))]
mod frames;
#[cfg(not(target_family = "wasm"))]
mod native;
#[cfg(target_family = "wasm")]
mod wasm;

use bevy::prelude::*;
use motor_twin::{MessageOutcome, config::BusConfig};

use crate::async_runtime::TaskSpawner;
use crate::controller::Twin;
use crate::launch_params::LaunchParams;

/// Plugin for the sensor subscription.
pub struct BusPlugin;

impl Plugin for BusPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BusChannels>()
            .init_resource::<BusStatus>()
            .add_systems(Startup, start_subscriber)
            .add_systems(Update, drain_bus_events);
    }
}

/// Something the transport task observed.
#[derive(Debug)]
pub enum BusEvent {
    /// The broker accepted the connection.
    Connected,
    /// The broker acknowledged the topic subscription.
    Subscribed,
    /// A message arrived.
    Message { topic: String, payload: Vec<u8> },
    /// The connection failed or was refused.
    Error(motor_twin::Error),
}

/// What a transport does in response to one incoming packet.
#[derive(Debug)]
pub enum Reaction {
    /// The broker accepted the connection: subscribe, then report it.
    Subscribe,
    /// Forward an event to the main thread.
    Report(BusEvent),
    /// Nothing to do.
    Ignore,
}

/// Connection state shown in the control panel.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub enum BusStatus {
    #[default]
    Connecting,
    Connected,
    Subscribed { topic: String },
    Failed(String),
}

impl BusStatus {
    pub fn label(&self) -> String {
        match self {
            BusStatus::Connecting => "Bus: connecting".to_string(),
            BusStatus::Connected => "Bus: connected".to_string(),
            BusStatus::Subscribed { topic } => format!("Bus: listening on {topic}"),
            BusStatus::Failed(message) => format!("Bus: {message}"),
        }
    }
}

/// Channel between the transport task and the main thread.
#[derive(Resource)]
pub struct BusChannels {
    rx: async_channel::Receiver<BusEvent>,
    tx: async_channel::Sender<BusEvent>,
}

impl Default for BusChannels {
    fn default() -> Self {
        let (tx, rx) = async_channel::unbounded();
        Self { rx, tx }
    }
}

/// Topic the running subscriber listens on.
#[derive(Resource)]
struct SubscribedTopic(String);

/// Start the transport task.
#[allow(clippy::needless_pass_by_value)]
fn start_subscriber(
    mut commands: Commands,
    params: Res<LaunchParams>,
    channels: Res<BusChannels>,
    spawner: TaskSpawner,
) {
    let config: BusConfig = params.bus.clone();
    let tx = channels.tx.clone();
    commands.insert_resource(SubscribedTopic(config.topic.clone()));

    tracing::info!(
        "Connecting to message bus at {} as {}",
        config.broker_url,
        config.client_id
    );

    #[cfg(not(target_family = "wasm"))]
    spawner.spawn(native::run(config, tx));
    #[cfg(target_family = "wasm")]
    spawner.spawn(wasm::run(config, tx));
}

/// Apply everything the transport task sent since the last frame.
#[allow(clippy::needless_pass_by_value)]
fn drain_bus_events(
    channels: Res<BusChannels>,
    topic: Option<Res<SubscribedTopic>>,
    mut twin: ResMut<Twin>,
    mut status: ResMut<BusStatus>,
) {
    while let Ok(event) = channels.rx.try_recv() {
        match event {
            BusEvent::Connected => {
                tracing::info!("Connected to message bus");
                *status = BusStatus::Connected;
            }
            BusEvent::Subscribed => {
                let topic = topic.as_ref().map(|t| t.0.clone()).unwrap_or_default();
                tracing::info!("Subscribed to {topic}");
                *status = BusStatus::Subscribed { topic };
            }
            BusEvent::Message { topic, payload } => handle_message(&mut twin, &topic, &payload),
            BusEvent::Error(e) => {
                tracing::error!("Message bus error: {e}");
                *status = BusStatus::Failed(e.to_string());
            }
        }
    }
}

/// Feed one payload to the twin. A bad payload only costs that message.
fn handle_message(twin: &mut Twin, topic: &str, payload: &[u8]) {
    match twin.apply_message(payload) {
        Ok(MessageOutcome::Applied { rate, .. }) => {
            tracing::debug!("Applied reading from {topic}: {:.0} RPM", rate.rpm());
        }
        Ok(MessageOutcome::Ignored) => {
            tracing::trace!("Ignored message from {topic} in manual mode");
        }
        Err(e) => {
            tracing::error!("Dropped message from {topic}: {e}");
        }
    }
}
