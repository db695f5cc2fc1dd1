use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

mod validation;

pub use validation::{validate_prefix, validate_topic, TopicError};

/// Raw event handed over by the message bus adapter.
///
/// The payload is kept as bytes; decoding happens when the event is stamped
/// into a [`Message`].
#[derive(Clone, Debug, PartialEq)]
pub struct BusEvent {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl BusEvent {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    /// Build an event carrying a JSON-serialized payload.
    pub fn json(topic: impl Into<String>, payload: &Value) -> Self {
        Self::new(topic, payload.to_string().into_bytes())
    }
}

/// Message is an immutable, timestamped record of one bus event.
///
/// Messages are created once by the ingestion buffer and never mutated.
/// Ids are UUIDv7, so they sort in arrival order as well.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// UUIDv7 identifier, stable key for clients
    pub id: Uuid,

    /// Full bus topic (e.g. "run42/satellite/location")
    pub topic: String,

    /// Decoded payload: JSON if the bytes parse, otherwise the text itself
    pub payload: Value,

    /// Wall-clock capture time
    pub received_at: DateTime<Utc>,
}

impl Message {
    /// Stamp a bus event with the given capture time.
    pub fn stamp(event: BusEvent, received_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            payload: decode_payload(&event.payload),
            topic: event.topic,
            received_at,
        }
    }
}

/// Decode a raw payload.
///
/// JSON payloads become structured values. Anything else is kept as a
/// (lossy) UTF-8 string so it can still be displayed.
pub fn decode_payload(bytes: &[u8]) -> Value {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => value,
        Err(_) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
    }
}
