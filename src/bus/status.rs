use serde::Serialize;
use std::fmt;

/// Connection status of the message bus, as surfaced to the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Transport events driving [`ConnectionStatus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// A connection attempt starts
    Dial,
    /// The broker acknowledged the connection
    Established,
    /// An established connection went away
    Dropped,
    /// The transport reported an error
    Failed,
}

impl ConnectionStatus {
    /// Next status after a transport event.
    ///
    /// `disconnected → connecting → connected`, `connected → disconnected`
    /// on a drop, and `error` from any state.
    pub fn on(self, event: LinkEvent) -> Self {
        use ConnectionStatus::*;

        match (self, event) {
            (_, LinkEvent::Failed) => Error,
            (Connected, LinkEvent::Dial) => Connected,
            (_, LinkEvent::Dial) => Connecting,
            (_, LinkEvent::Established) => Connected,
            (Connected, LinkEvent::Dropped) => Disconnected,
            (other, LinkEvent::Dropped) => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Error => "error",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
