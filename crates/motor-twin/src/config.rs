//! Default endpoints, asset names and timing constants.

/// Broker the twin subscribes to when nothing else is configured.
pub const DEFAULT_BROKER_URL: &str = "wss://test.mosquitto.org:8081/mqtt";

/// Topic carrying the motor's sensor readings.
pub const DEFAULT_TOPIC: &str = "esp32/sensors";

/// Model file, relative to the client's asset directory.
pub const DEFAULT_MODEL_PATH: &str = "electric_motor.glb";

/// Mesh node names that spin with the rotor.
pub const DEFAULT_ROTATING_PARTS: [&str; 2] = ["shaft_mat_0", "vent_mat2_0"];

/// Display refresh rate the per-frame rotation step assumes.
pub const ASSUMED_FPS: f64 = 60.0;

/// Prefix for generated MQTT client ids.
pub const CLIENT_ID_PREFIX: &str = "motor-twin";

/// Build a client id from a random suffix.
pub fn client_id(suffix: u32) -> String {
    format!("{CLIENT_ID_PREFIX}-{suffix:08x}")
}

/// Where the message bus lives and what to listen to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusConfig {
    /// WebSocket URL of the broker.
    pub broker_url: String,
    /// Topic to subscribe to.
    pub topic: String,
    /// MQTT client id.
    pub client_id: String,
}

impl BusConfig {
    /// Bus config with the default broker and topic and the given client id.
    pub fn with_client_id(client_id: String) -> Self {
        Self {
            broker_url: DEFAULT_BROKER_URL.to_string(),
            topic: DEFAULT_TOPIC.to_string(),
            client_id,
        }
    }

    /// Port implied by the broker URL, falling back to the scheme default.
    pub fn port(&self) -> u16 {
        let (scheme, rest) = self
            .broker_url
            .split_once("://")
            .unwrap_or(("wss", self.broker_url.as_str()));
        let authority = rest.split('/').next().unwrap_or_default();
        authority
            .rsplit_once(':')
            .and_then(|(_, port)| port.parse().ok())
            .unwrap_or(if scheme == "ws" { 80 } else { 443 })
    }
}
