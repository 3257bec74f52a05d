//! Browser transport: `WebSocket` with the `mqtt` subprotocol.
//!
//! Socket callbacks only push raw frames into a local channel; the async task
//! reassembles them into MQTT packets and reports to the main thread.

use motor_twin::config::BusConfig;
use mqttrs::{Connect, Packet, Pid, Protocol, QoS, Subscribe, SubscribeTopic};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{BinaryType, CloseEvent, Event, MessageEvent, WebSocket};

use super::frames::{FrameReader, transport_error};
use super::{BusEvent, Reaction};

/// Keep-alive sent in CONNECT. Zero disables it, as the browser task has no timer.
const KEEP_ALIVE_SECS: u16 = 0;

/// Largest packet the task sends.
const SEND_BUFFER: usize = 1024;

/// What a socket callback observed.
enum SocketEvent {
    Open,
    Frame(Vec<u8>),
    Error,
    Closed { code: u16, reason: String },
}

/// Run the subscriber until the socket closes.
pub async fn run(config: BusConfig, tx: async_channel::Sender<BusEvent>) {
    let socket = match WebSocket::new_with_str(&config.broker_url, "mqtt") {
        Ok(socket) => socket,
        Err(e) => {
            let error = transport_error(&config.broker_url, format!("{e:?}"));
            let _ = tx.send(BusEvent::Error(error)).await;
            return;
        }
    };
    socket.set_binary_type(BinaryType::Arraybuffer);

    let (frame_tx, frame_rx) = async_channel::unbounded::<SocketEvent>();
    let mut reader = FrameReader::new(config.broker_url.clone());

    let on_open = Closure::<dyn FnMut(Event)>::new({
        let frame_tx = frame_tx.clone();
        move |_: Event| {
            let _ = frame_tx.try_send(SocketEvent::Open);
        }
    });
    let on_message = Closure::<dyn FnMut(MessageEvent)>::new({
        let frame_tx = frame_tx.clone();
        move |event: MessageEvent| {
            if let Ok(buffer) = event.data().dyn_into::<js_sys::ArrayBuffer>() {
                let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
                let _ = frame_tx.try_send(SocketEvent::Frame(bytes));
            }
        }
    });
    let on_error = Closure::<dyn FnMut(Event)>::new({
        let frame_tx = frame_tx.clone();
        move |_: Event| {
            let _ = frame_tx.try_send(SocketEvent::Error);
        }
    });
    let on_close = Closure::<dyn FnMut(CloseEvent)>::new(move |event: CloseEvent| {
        let _ = frame_tx.try_send(SocketEvent::Closed {
            code: event.code(),
            reason: event.reason(),
        });
    });

    socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
    socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
    socket.set_onerror(Some(on_error.as_ref().unchecked_ref()));
    socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));

    'events: while let Ok(event) = frame_rx.recv().await {
        let events: Vec<BusEvent> = match event {
            SocketEvent::Open => send_packet(
                &socket,
                &Packet::Connect(Connect {
                    protocol: Protocol::MQTT311,
                    keep_alive: KEEP_ALIVE_SECS,
                    client_id: &config.client_id,
                    clean_session: true,
                    last_will: None,
                    username: None,
                    password: None,
                }),
            )
            .err()
            .map(|e| BusEvent::Error(transport_error(&config.broker_url, e)))
            .into_iter()
            .collect(),
            SocketEvent::Frame(bytes) => reader
                .feed(&bytes)
                .into_iter()
                .filter_map(|reaction| perform(&socket, &config, reaction))
                .collect(),
            SocketEvent::Error => vec![BusEvent::Error(transport_error(
                &config.broker_url,
                "websocket error".to_string(),
            ))],
            SocketEvent::Closed { code, reason } => {
                let _ = tx
                    .send(BusEvent::Error(transport_error(
                        &config.broker_url,
                        format!("connection closed ({code}) {reason}"),
                    )))
                    .await;
                break;
            }
        };

        for event in events {
            if tx.send(event).await.is_err() {
                break 'events;
            }
        }
    }

    socket.set_onopen(None);
    socket.set_onmessage(None);
    socket.set_onerror(None);
    socket.set_onclose(None);
    tracing::debug!("Message bus task stopped");
}

/// Carry out one packet reaction, returning what to report.
fn perform(socket: &WebSocket, config: &BusConfig, reaction: Reaction) -> Option<BusEvent> {
    match reaction {
        Reaction::Subscribe => {
            let subscribe = Packet::Subscribe(Subscribe {
                pid: Pid::new(),
                topics: vec![SubscribeTopic {
                    topic_path: config.topic.clone(),
                    qos: QoS::AtMostOnce,
                }],
            });
            match send_packet(socket, &subscribe) {
                Ok(()) => Some(BusEvent::Connected),
                Err(e) => Some(BusEvent::Error(transport_error(&config.broker_url, e))),
            }
        }
        Reaction::Report(event) => Some(event),
        Reaction::Ignore => None,
    }
}

fn send_packet(socket: &WebSocket, packet: &Packet<'_>) -> Result<(), String> {
    let mut buf = [0u8; SEND_BUFFER];
    let len =
        mqttrs::encode_slice(packet, &mut buf).map_err(|e| format!("encode failed: {e:?}"))?;
    socket
        .send_with_u8_array(&buf[..len])
        .map_err(|e| format!("send failed: {e:?}"))
}
