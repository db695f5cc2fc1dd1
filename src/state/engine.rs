use super::buffer::IngestionBuffer;
use super::nodes::NodeDiscovery;
use super::status::StatusExtractor;
use super::view::LogView;
use crate::message::{validate_prefix, validate_topic, BusEvent, Message, TopicError};
use crate::payload::{KnownPayload, Node, Status};
use crate::topic::wildcard;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info, warn};

/// Errors raised by monitor state edits
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorError {
    ViewNotFound(usize),
    Topic(TopicError),
}

impl fmt::Display for MonitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorError::ViewNotFound(index) => write!(f, "log view {} does not exist", index),
            MonitorError::Topic(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for MonitorError {}

impl From<TopicError> for MonitorError {
    fn from(e: TopicError) -> Self {
        MonitorError::Topic(e)
    }
}

/// What a single ingestion changed
#[derive(Clone, Debug)]
pub struct Ingested {
    pub message: Message,
    /// New status, if the message was a time status
    pub status: Option<Status>,
    /// Newly discovered node, if any
    pub node: Option<Node>,
}

/// Monitor owns the whole console state for one run prefix.
///
/// Everything shown to users is derived from the ingestion buffer on demand,
/// so display windows and topic lists are always consistent with the
/// current selection, exclusion and window size.
#[derive(Debug)]
pub struct Monitor {
    prefix: String,
    buffer: IngestionBuffer,
    status: StatusExtractor,
    nodes: NodeDiscovery,
    views: Vec<LogView>,
    default_max_count: usize,
}

impl Monitor {
    /// Create a monitor with `view_count` panels (at least one).
    pub fn new(prefix: impl Into<String>, view_count: usize, default_max_count: usize) -> Self {
        let prefix = prefix.into();
        let views = (0..view_count.max(1))
            .map(|_| LogView::new(&prefix, default_max_count))
            .collect();

        Self {
            prefix,
            buffer: IngestionBuffer::new(),
            status: StatusExtractor::new(),
            nodes: NodeDiscovery::new(),
            views,
            default_max_count,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Ingest a bus event stamped with the current time.
    pub fn ingest(&mut self, event: BusEvent) -> Ingested {
        self.ingest_at(event, Utc::now())
    }

    /// Ingest a bus event with an explicit capture time.
    ///
    /// The message is appended first, then inspected for status and node
    /// announcements. A malformed payload on a recognized topic only skips
    /// that update.
    pub fn ingest_at(&mut self, event: BusEvent, received_at: DateTime<Utc>) -> Ingested {
        let message = self.buffer.append_at(event, received_at).clone();
        debug!(topic = %message.topic, id = %message.id, "Ingested message");

        let mut ingested = Ingested {
            message,
            status: None,
            node: None,
        };

        match KnownPayload::parse(&ingested.message, &self.prefix) {
            Ok(Some(KnownPayload::TimeStatus(status))) => {
                ingested.status = Some(self.status.replace(status).clone());
            }
            Ok(Some(KnownPayload::NodeInfo(node))) => {
                if self.nodes.discover(node.clone()) {
                    info!(name = node.name().unwrap_or("<unnamed>"), "Discovered node");
                    ingested.node = Some(node);
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Skipping malformed payload");
            }
        }

        ingested
    }

    /// Full session history in arrival order.
    pub fn history(&self) -> &[Message] {
        self.buffer.messages()
    }

    pub fn status(&self) -> &Status {
        self.status.current()
    }

    pub fn nodes(&self) -> &[Node] {
        self.nodes.nodes()
    }

    pub fn views(&self) -> &[LogView] {
        &self.views
    }

    pub fn view(&self, index: usize) -> Result<&LogView, MonitorError> {
        self.views.get(index).ok_or(MonitorError::ViewNotFound(index))
    }

    fn view_mut(&mut self, index: usize) -> Result<&mut LogView, MonitorError> {
        self.views
            .get_mut(index)
            .ok_or(MonitorError::ViewNotFound(index))
    }

    /// Display window of a panel, newest first.
    pub fn display(&self, index: usize) -> Result<Vec<&Message>, MonitorError> {
        Ok(self.view(index)?.display(self.buffer.messages(), &self.prefix))
    }

    /// Topic selector entries of a panel.
    pub fn topics(&self, index: usize) -> Result<Vec<String>, MonitorError> {
        Ok(self.view(index)?.topics(self.buffer.messages(), &self.prefix))
    }

    /// Replace a panel's selection.
    ///
    /// Entries must be concrete topics or the run wildcard.
    pub fn set_selection(&mut self, index: usize, topics: Vec<String>) -> Result<(), MonitorError> {
        let selection = self.checked_topics(topics, true)?;
        self.view_mut(index)?.selection = selection;
        Ok(())
    }

    /// Replace a panel's exclusion list.
    pub fn set_exclusion(&mut self, index: usize, topics: Vec<String>) -> Result<(), MonitorError> {
        let exclusion = self.checked_topics(topics, false)?;
        self.view_mut(index)?.exclusion = exclusion;
        Ok(())
    }

    pub fn set_max_count(&mut self, index: usize, max_count: usize) -> Result<(), MonitorError> {
        self.view_mut(index)?.max_count = max_count;
        Ok(())
    }

    /// Grow or shrink the number of panels; at least one is kept.
    ///
    /// Existing panels keep their settings. Returns the new count.
    pub fn set_view_count(&mut self, count: usize) -> usize {
        let count = count.max(1);
        let prefix = self.prefix.clone();
        let max_count = self.default_max_count;
        self.views
            .resize_with(count, || LogView::new(&prefix, max_count));
        count
    }

    /// Switch to another run, dropping all session state.
    pub fn change_prefix(&mut self, prefix: &str) -> Result<(), MonitorError> {
        validate_prefix(prefix)?;

        let view_count = self.views.len();
        *self = Self::new(prefix, view_count, self.default_max_count);
        info!(prefix = %prefix, "Prefix changed, session reset");
        Ok(())
    }

    fn checked_topics(
        &self,
        topics: Vec<String>,
        allow_wildcard: bool,
    ) -> Result<BTreeSet<String>, MonitorError> {
        let run_wildcard = wildcard(&self.prefix);
        topics
            .into_iter()
            .map(|topic| -> Result<String, MonitorError> {
                if !(allow_wildcard && topic == run_wildcard) {
                    validate_topic(&topic)?;
                }
                Ok(topic)
            })
            .collect()
    }
}
