use crate::bus::ConnectionStatus;
use crate::state::{MonitorUpdate, Selection};
use crate::subscription::protocol::{ClientMessage, ServerMessage};
use crate::topic::is_time_status_noise;
use axum::extract::ws::{Message, WebSocket};
use std::collections::BTreeSet;
use tokio::sync::{broadcast, watch};
use tracing::{error, info, warn};

/// Manages a single WebSocket connection with topic subscriptions
pub struct ConnectionManager {
    /// Run prefix the subscriptions are resolved against
    prefix: String,
    /// Topics this connection wants log messages for; empty means all,
    /// `<prefix>/#` means the whole run
    subscriptions: BTreeSet<String>,
}

impl ConnectionManager {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            subscriptions: BTreeSet::new(),
        }
    }

    /// Handle WebSocket connection lifecycle
    pub async fn handle(
        mut self,
        mut socket: WebSocket,
        mut updates_rx: broadcast::Receiver<MonitorUpdate>,
        mut connection_rx: watch::Receiver<ConnectionStatus>,
    ) {
        info!("WebSocket connection established");

        let initial = ServerMessage::Connection {
            status: *connection_rx.borrow_and_update(),
        };
        if let Err(e) = send(&mut socket, &initial).await {
            error!(error = %e, "Failed to send initial connection status");
            return;
        }

        loop {
            tokio::select! {
                // Handle incoming client messages
                Some(msg) = socket.recv() => {
                    match msg {
                        Ok(Message::Text(text)) => {
                            if let Err(e) = self.handle_client_message(&text) {
                                warn!(error = %e, "Invalid client message");
                                if send(&mut socket, &ServerMessage::error(e.to_string())).await.is_err() {
                                    break;
                                }
                            }
                        }
                        Ok(Message::Close(_)) => {
                            info!("WebSocket client disconnected");
                            break;
                        }
                        Ok(Message::Ping(data)) => {
                            if let Err(e) = socket.send(Message::Pong(data)).await {
                                error!(error = %e, "Failed to send pong");
                                break;
                            }
                        }
                        Ok(_) => {
                            // Ignore binary, pong messages
                        }
                        Err(e) => {
                            warn!(error = %e, "WebSocket error");
                            break;
                        }
                    }
                }

                // Forward monitor updates
                result = updates_rx.recv() => {
                    match result {
                        Ok(update) => {
                            self.observe(&update);
                            if self.should_forward(&update) {
                                if let Err(e) = send(&mut socket, &ServerMessage::from(update)).await {
                                    error!(error = %e, "Failed to send monitor update");
                                    break;
                                }
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped = skipped, "WebSocket lagged, skipped updates");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            error!("Monitor update channel closed");
                            break;
                        }
                    }
                }

                // Forward bus connection status changes
                changed = connection_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let status = *connection_rx.borrow_and_update();
                    if let Err(e) = send(&mut socket, &ServerMessage::Connection { status }).await {
                        error!(error = %e, "Failed to send connection status");
                        break;
                    }
                }

                else => {
                    break;
                }
            }
        }

        info!("WebSocket connection closed");
    }

    /// Handle client message (subscribe/unsubscribe)
    fn handle_client_message(&mut self, text: &str) -> anyhow::Result<()> {
        let msg: ClientMessage = serde_json::from_str(text)?;

        match msg {
            ClientMessage::Subscribe { topic } => {
                info!(topic = %topic, "Client subscribed to topic");
                self.subscriptions.insert(topic);
            }
            ClientMessage::Unsubscribe { topic } => {
                info!(topic = %topic, "Client unsubscribed from topic");
                self.subscriptions.remove(&topic);
            }
        }

        Ok(())
    }

    /// Follow prefix changes; subscriptions of the old run are dropped.
    fn observe(&mut self, update: &MonitorUpdate) {
        if let MonitorUpdate::Reset { prefix } = update {
            self.prefix = prefix.clone();
            self.subscriptions.clear();
        }
    }

    /// Check if an update should be forwarded to this connection.
    ///
    /// Log messages follow the same rules as a log panel: manager time
    /// telemetry is never forwarded and subscriptions select like a panel
    /// selection. Status, node and reset updates always go out.
    fn should_forward(&self, update: &MonitorUpdate) -> bool {
        match update {
            MonitorUpdate::Message(message) => {
                !is_time_status_noise(&message.topic)
                    && Selection::resolve(&self.prefix, &self.subscriptions).matches(&message.topic)
            }
            _ => true,
        }
    }
}

async fn send(socket: &mut WebSocket, message: &ServerMessage) -> anyhow::Result<()> {
    let json = serde_json::to_string(message)?;
    socket.send(Message::Text(json)).await?;
    Ok(())
}
