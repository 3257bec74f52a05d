//! Native transport: `rumqttc` over WebSocket.

use std::time::Duration;

use motor_twin::config::BusConfig;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS, Transport};

use super::frames::transport_error;
use super::{BusEvent, Reaction};

/// Keep-alive interval negotiated with the broker.
const KEEP_ALIVE: Duration = Duration::from_secs(60);

/// Pause after a connection error before polling again.
///
/// Polling the event loop after an error reconnects; this only keeps a dead
/// broker from being hammered.
const ERROR_PAUSE: Duration = Duration::from_secs(1);

/// Capacity of the client's request queue.
const REQUEST_CAPACITY: usize = 10;

/// Run the subscriber until the main thread drops its receiver.
pub async fn run(config: BusConfig, tx: async_channel::Sender<BusEvent>) {
    let mut options = MqttOptions::new(
        config.client_id.clone(),
        config.broker_url.clone(),
        config.port(),
    );
    options.set_keep_alive(KEEP_ALIVE);
    options.set_transport(if config.broker_url.starts_with("ws://") {
        Transport::Ws
    } else {
        Transport::wss_with_default_config()
    });

    let (client, mut eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);

    while !tx.is_closed() {
        let reaction = match eventloop.poll().await {
            Ok(event) => react(event),
            Err(e) => {
                let error = transport_error(&config.broker_url, e.to_string());
                let _ = tx.send(BusEvent::Error(error)).await;
                tokio::time::sleep(ERROR_PAUSE).await;
                continue;
            }
        };

        let event = match reaction {
            Reaction::Subscribe => {
                // Clean sessions forget subscriptions, so subscribe on every connect.
                if let Err(e) = client.try_subscribe(config.topic.clone(), QoS::AtMostOnce) {
                    let error = transport_error(&config.broker_url, e.to_string());
                    let _ = tx.send(BusEvent::Error(error)).await;
                }
                BusEvent::Connected
            }
            Reaction::Report(event) => event,
            Reaction::Ignore => continue,
        };

        if tx.send(event).await.is_err() {
            break;
        }
    }

    tracing::debug!("Message bus task stopped");
}

/// Map one event loop notification to what the task should do.
///
/// Refused connections surface as poll errors, so every `ConnAck` seen here
/// was accepted.
fn react(event: Event) -> Reaction {
    match event {
        Event::Incoming(Packet::ConnAck(_)) => Reaction::Subscribe,
        Event::Incoming(Packet::SubAck(_)) => Reaction::Report(BusEvent::Subscribed),
        Event::Incoming(Packet::Publish(publish)) => Reaction::Report(BusEvent::Message {
            topic: publish.topic,
            payload: publish.payload.to_vec(),
        }),
        _ => Reaction::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use rumqttc::{ConnAck, ConnectReturnCode, Outgoing, Publish, SubAck, SubscribeReasonCode};

    use super::*;

    #[test]
    fn test_connack_subscribes() {
        let event = Event::Incoming(Packet::ConnAck(ConnAck::new(
            ConnectReturnCode::Success,
            false,
        )));
        assert!(matches!(react(event), Reaction::Subscribe));
    }

    #[test]
    fn test_suback_reports_subscribed() {
        let event = Event::Incoming(Packet::SubAck(SubAck::new(
            1,
            vec![SubscribeReasonCode::Success(QoS::AtMostOnce)],
        )));
        assert!(matches!(
            react(event),
            Reaction::Report(BusEvent::Subscribed)
        ));
    }

    #[test]
    fn test_publish_forwards_topic_and_payload() {
        let event = Event::Incoming(Packet::Publish(Publish::new(
            "esp32/sensors",
            QoS::AtMostOnce,
            r#"{"rpm":1200}"#,
        )));
        match react(event) {
            Reaction::Report(BusEvent::Message { topic, payload }) => {
                assert_eq!(topic, "esp32/sensors");
                assert_eq!(payload, br#"{"rpm":1200}"#);
            }
            other => panic!("unexpected reaction: {other:?}"),
        }
    }

    #[test]
    fn test_housekeeping_is_ignored() {
        assert!(matches!(
            react(Event::Incoming(Packet::PingResp)),
            Reaction::Ignore
        ));
        assert!(matches!(
            react(Event::Outgoing(Outgoing::PingReq)),
            Reaction::Ignore
        ));
    }
}
