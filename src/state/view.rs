use super::filter::{compute_display, passes_exclusion};
use super::registry::available_topics;
use crate::message::Message;
use crate::topic::wildcard;
use serde::Serialize;
use std::collections::BTreeSet;

/// Default number of messages in a display window
pub const DEFAULT_MAX_COUNT: usize = 200;

/// One log panel: its own topic selection, exclusion list and window size.
///
/// All panels read the same session history.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogView {
    pub selection: BTreeSet<String>,
    pub exclusion: BTreeSet<String>,
    pub max_count: usize,
}

impl LogView {
    /// New panel showing the whole run.
    pub fn new(prefix: &str, max_count: usize) -> Self {
        Self {
            selection: BTreeSet::from([wildcard(prefix)]),
            exclusion: BTreeSet::new(),
            max_count,
        }
    }

    /// Current display window over `history`, newest first.
    pub fn display<'a>(&self, history: &'a [Message], prefix: &str) -> Vec<&'a Message> {
        compute_display(
            history,
            prefix,
            &self.selection,
            &self.exclusion,
            self.max_count,
        )
    }

    /// Topics offered by this panel's topic selector.
    pub fn topics(&self, history: &[Message], prefix: &str) -> Vec<String> {
        available_topics(
            history.iter().filter(|m| passes_exclusion(m, &self.exclusion)),
            prefix,
        )
    }
}
