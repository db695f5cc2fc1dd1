use crate::message::{BusEvent, Message};
use chrono::{DateTime, Utc};

/// Append-only history of every message seen this session.
///
/// No bound is applied here: truncation belongs to the display window, so
/// status extraction and node discovery see each message exactly once.
#[derive(Debug, Default)]
pub struct IngestionBuffer {
    messages: Vec<Message>,
}

impl IngestionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp an event with the current wall-clock time and append it.
    pub fn append(&mut self, event: BusEvent) -> &Message {
        self.append_at(event, Utc::now())
    }

    /// Stamp an event with an explicit capture time and append it.
    pub fn append_at(&mut self, event: BusEvent, received_at: DateTime<Utc>) -> &Message {
        let index = self.messages.len();
        self.messages.push(Message::stamp(event, received_at));
        &self.messages[index]
    }

    /// All messages in arrival order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop the session history (prefix change only).
    pub(crate) fn clear(&mut self) {
        self.messages.clear();
    }
}
