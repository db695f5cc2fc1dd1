use crate::bus::ConnectionStatus;
use crate::message::Message;
use crate::payload::{Node, Status};
use crate::state::MonitorUpdate;
use serde::{Deserialize, Serialize};

/// Client → Server message types
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Only forward log messages on this topic (cumulative)
    #[serde(rename = "subscribe")]
    Subscribe { topic: String },
    #[serde(rename = "unsubscribe")]
    Unsubscribe { topic: String },
}

/// Server → Client message types
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Newly ingested message
    Message { message: Message },
    /// Time status replaced
    Status { status: Status, header: String },
    /// New node discovered
    Node { node: Node },
    /// Bus connection status changed
    Connection { status: ConnectionStatus },
    /// Session reset after a prefix change
    Reset { prefix: String },
    Error { error: String },
}

impl From<MonitorUpdate> for ServerMessage {
    fn from(update: MonitorUpdate) -> Self {
        match update {
            MonitorUpdate::Message(message) => ServerMessage::Message { message },
            MonitorUpdate::Status(status) => ServerMessage::Status {
                header: status.header_text(),
                status,
            },
            MonitorUpdate::NodeDiscovered(node) => ServerMessage::Node { node },
            MonitorUpdate::Reset { prefix } => ServerMessage::Reset { prefix },
        }
    }
}

impl ServerMessage {
    pub fn error(error: impl Into<String>) -> Self {
        ServerMessage::Error {
            error: error.into(),
        }
    }
}
