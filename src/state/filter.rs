use crate::message::Message;
use crate::topic::{is_time_status_noise, run_namespace, wildcard};
use std::collections::BTreeSet;

/// Exclusion step: drops excluded topics and manager time-status telemetry.
pub fn passes_exclusion(message: &Message, exclusion: &BTreeSet<String>) -> bool {
    !exclusion.contains(&message.topic) && !is_time_status_noise(&message.topic)
}

/// Selection step, resolved once per recomputation.
pub(crate) enum Selection<'a> {
    /// Nothing selected: keep everything
    All,
    /// Run wildcard selected: substring match on `<prefix>/`, literals ignored
    Run(String),
    /// Exact topic membership
    Topics(&'a BTreeSet<String>),
}

impl<'a> Selection<'a> {
    pub(crate) fn resolve(prefix: &str, selection: &'a BTreeSet<String>) -> Self {
        if selection.is_empty() {
            Selection::All
        } else if selection.contains(&wildcard(prefix)) {
            Selection::Run(run_namespace(prefix))
        } else {
            Selection::Topics(selection)
        }
    }

    pub(crate) fn matches(&self, topic: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Run(namespace) => topic.contains(namespace.as_str()),
            Selection::Topics(topics) => topics.contains(topic),
        }
    }
}

/// Compute the display window.
///
/// Exclusion first, then selection, newest first, truncated to `max_count`.
/// Pure function of its inputs.
pub fn compute_display<'a>(
    history: &'a [Message],
    prefix: &str,
    selection: &BTreeSet<String>,
    exclusion: &BTreeSet<String>,
    max_count: usize,
) -> Vec<&'a Message> {
    let selection = Selection::resolve(prefix, selection);

    history
        .iter()
        .rev()
        .filter(|m| passes_exclusion(m, exclusion))
        .filter(|m| selection.matches(&m.topic))
        .take(max_count)
        .collect()
}
