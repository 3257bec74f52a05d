//! MQTT packet framing over a WebSocket byte stream.
//!
//! WebSocket frame boundaries carry no meaning for MQTT: one frame may hold
//! several packets and one packet may span several frames. [`FrameReader`]
//! buffers incoming bytes and yields a [`Reaction`] per complete packet.

use mqttrs::{ConnectReturnCode, Packet};

use super::{BusEvent, Reaction};

/// Longest encoding of the remaining-length field, in bytes.
const MAX_LENGTH_BYTES: usize = 4;

/// Reassembles MQTT packets from WebSocket frames.
#[derive(Debug)]
pub struct FrameReader {
    endpoint: String,
    pending: Vec<u8>,
}

impl FrameReader {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            pending: Vec::new(),
        }
    }

    /// Bytes held back waiting for the rest of a packet.
    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Append one frame and react to every packet it completes.
    ///
    /// A corrupt stream cannot be resynchronised, so on a decode error the
    /// buffer is discarded and an error is reported.
    pub fn feed(&mut self, frame: &[u8]) -> Vec<Reaction> {
        self.pending.extend_from_slice(frame);

        let mut reactions = Vec::new();
        loop {
            let len = match packet_len(&self.pending) {
                Ok(Some(len)) if len <= self.pending.len() => len,
                Ok(_) => break,
                Err(message) => {
                    self.pending.clear();
                    reactions.push(self.error(message));
                    break;
                }
            };

            let reaction = match mqttrs::decode_slice(&self.pending[..len]) {
                Ok(Some(packet)) => react(&packet, &self.endpoint),
                Ok(None) => self.error("truncated packet".to_string()),
                Err(e) => self.error(format!("bad packet: {e:?}")),
            };
            self.pending.drain(..len);
            reactions.push(reaction);
        }
        reactions
    }

    fn error(&self, message: String) -> Reaction {
        Reaction::Report(BusEvent::Error(transport_error(&self.endpoint, message)))
    }
}

/// Total length of the packet at the start of `buf`, once its fixed header
/// is complete.
fn packet_len(buf: &[u8]) -> Result<Option<usize>, String> {
    let mut remaining = 0usize;
    for (i, &byte) in buf.iter().skip(1).take(MAX_LENGTH_BYTES).enumerate() {
        remaining |= usize::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(Some(1 + (i + 1) + remaining));
        }
    }
    if buf.len() > MAX_LENGTH_BYTES {
        Err("malformed remaining length".to_string())
    } else {
        Ok(None)
    }
}

/// Map one decoded packet to what the transport should do.
fn react(packet: &Packet<'_>, endpoint: &str) -> Reaction {
    match packet {
        Packet::Connack(ack) if matches!(ack.code, ConnectReturnCode::Accepted) => {
            Reaction::Subscribe
        }
        Packet::Connack(ack) => Reaction::Report(BusEvent::Error(transport_error(
            endpoint,
            format!("connection refused: {:?}", ack.code),
        ))),
        Packet::Suback(_) => Reaction::Report(BusEvent::Subscribed),
        Packet::Publish(publish) => Reaction::Report(BusEvent::Message {
            topic: publish.topic_name.to_string(),
            payload: publish.payload.to_vec(),
        }),
        _ => Reaction::Ignore,
    }
}

pub fn transport_error(endpoint: &str, message: String) -> motor_twin::Error {
    motor_twin::Error::Transport {
        endpoint: endpoint.to_string(),
        message,
    }
}
