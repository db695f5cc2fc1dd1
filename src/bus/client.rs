use super::status::{ConnectionStatus, LinkEvent};
use crate::message::BusEvent;
use anyhow::{Context, Result};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// MQTT configuration
#[derive(Clone, Debug, Deserialize)]
pub struct MqttConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_keep_alive_seconds")]
    pub keep_alive_seconds: u64,
    /// Topic filter to subscribe to; the console listens to everything
    #[serde(default = "default_subscribe_topic")]
    pub subscribe_topic: String,
    #[serde(default = "default_reconnect_delay_seconds")]
    pub reconnect_delay_seconds: u64,
    /// Capacity of the bus → ingestion channel
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_host() -> String {
    std::env::var("MQTT_HOST").unwrap_or_else(|_| "localhost".to_string())
}

fn default_port() -> u16 {
    std::env::var("MQTT_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(1883)
}

fn default_client_id() -> String {
    "testbed-monitor".to_string()
}

fn default_keep_alive_seconds() -> u64 {
    5
}

fn default_subscribe_topic() -> String {
    "#".to_string()
}

fn default_reconnect_delay_seconds() -> u64 {
    2
}

fn default_channel_capacity() -> usize {
    1024
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            client_id: default_client_id(),
            username: std::env::var("MQTT_USERNAME").ok(),
            password: std::env::var("MQTT_PASSWORD").ok(),
            keep_alive_seconds: default_keep_alive_seconds(),
            subscribe_topic: default_subscribe_topic(),
            reconnect_delay_seconds: default_reconnect_delay_seconds(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl MqttConfig {
    fn options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.client_id, &self.host, self.port);
        options.set_keep_alive(Duration::from_secs(self.keep_alive_seconds.max(1)));
        if let Some(username) = &self.username {
            options.set_credentials(username, self.password.clone().unwrap_or_default());
        }
        options
    }
}

/// MQTT message bus adapter.
///
/// Delivers every publish on the subscribed filter, in broker order, as a
/// [`BusEvent`] and tracks the connection status. Reconnection is handled
/// here: after a transport error the event loop waits
/// `reconnect_delay_seconds` and dials again, resubscribing on every
/// connection acknowledgement.
pub struct MqttBus {
    client: AsyncClient,
    status_rx: watch::Receiver<ConnectionStatus>,
}

impl MqttBus {
    /// Start the adapter, forwarding events into `events`.
    ///
    /// The returned task ends when `events` is closed.
    pub fn spawn(config: MqttConfig, events: mpsc::Sender<BusEvent>) -> (Self, JoinHandle<()>) {
        info!(host = %config.host, port = config.port, "Connecting to MQTT broker");

        let (client, eventloop) = AsyncClient::new(config.options(), 64);
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Disconnected);

        let task = tokio::spawn(run_event_loop(
            client.clone(),
            eventloop,
            config,
            events,
            status_tx,
        ));

        (Self { client, status_rx }, task)
    }

    /// Current connection status
    pub fn status(&self) -> ConnectionStatus {
        *self.status_rx.borrow()
    }

    /// Watch connection status changes
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_rx.clone()
    }

    /// Disconnect from the broker
    pub async fn disconnect(&self) -> Result<()> {
        self.client
            .disconnect()
            .await
            .context("Failed to disconnect from MQTT broker")
    }
}

fn advance(status_tx: &watch::Sender<ConnectionStatus>, event: LinkEvent) {
    status_tx.send_if_modified(|status| {
        let next = status.on(event);
        let changed = next != *status;
        if changed {
            info!(from = %status, to = %next, "Bus connection status changed");
            *status = next;
        }
        changed
    });
}

async fn run_event_loop(
    client: AsyncClient,
    mut eventloop: EventLoop,
    config: MqttConfig,
    events: mpsc::Sender<BusEvent>,
    status_tx: watch::Sender<ConnectionStatus>,
) {
    let reconnect_delay = Duration::from_secs(config.reconnect_delay_seconds);
    advance(&status_tx, LinkEvent::Dial);

    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                advance(&status_tx, LinkEvent::Established);
                if let Err(e) = client.try_subscribe(config.subscribe_topic.as_str(), QoS::AtMostOnce) {
                    error!(error = %e, topic = %config.subscribe_topic, "Failed to subscribe");
                } else {
                    info!(topic = %config.subscribe_topic, "Subscribed");
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                debug!(topic = %publish.topic, bytes = publish.payload.len(), "Received publish");
                let event = BusEvent::new(publish.topic, publish.payload.to_vec());
                if events.send(event).await.is_err() {
                    warn!("Ingestion channel closed, stopping bus adapter");
                    break;
                }
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                advance(&status_tx, LinkEvent::Dropped);
            }
            Ok(_) => {}
            Err(e) => {
                let event = if *status_tx.borrow() == ConnectionStatus::Connected {
                    LinkEvent::Dropped
                } else {
                    LinkEvent::Failed
                };
                warn!(error = %e, "MQTT connection error");
                advance(&status_tx, event);

                tokio::time::sleep(reconnect_delay).await;
                advance(&status_tx, LinkEvent::Dial);
            }
        }
    }

    advance(&status_tx, LinkEvent::Dropped);
}
