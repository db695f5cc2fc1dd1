//! Typed payloads for the recognized topic conventions.
//!
//! Parsing fails soft: a payload that is not a JSON object yields a
//! [`PayloadError`] and the caller skips the update. An object with missing
//! fields still parses, with those fields left blank.

use crate::message::Message;
use crate::topic::{classify, TopicKind};
use std::fmt;

mod node;
mod status;

pub use node::Node;
pub use status::Status;

/// Errors raised while reading a recognized payload
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadError {
    NotAnObject { topic: String },
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadError::NotAnObject { topic } => {
                write!(f, "payload on '{}' is not a JSON object", topic)
            }
        }
    }
}

impl std::error::Error for PayloadError {}

/// Payload of a message on a recognized topic
#[derive(Debug, Clone, PartialEq)]
pub enum KnownPayload {
    TimeStatus(Status),
    NodeInfo(Node),
}

impl KnownPayload {
    /// Parse a message against the run's topic conventions.
    ///
    /// Returns `Ok(None)` for ordinary log topics.
    pub fn parse(message: &Message, prefix: &str) -> Result<Option<Self>, PayloadError> {
        match classify(&message.topic, prefix) {
            TopicKind::TimeStatus => {
                Status::from_payload(&message.topic, &message.payload).map(|s| Some(Self::TimeStatus(s)))
            }
            TopicKind::Info => {
                Node::from_payload(&message.topic, &message.payload).map(|n| Some(Self::NodeInfo(n)))
            }
            TopicKind::Log => Ok(None),
        }
    }
}
