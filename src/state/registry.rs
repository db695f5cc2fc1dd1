use crate::message::Message;
use crate::topic::{belongs_to_run, wildcard};
use std::collections::HashSet;

/// Distinct run topics in first-seen order, followed by the run wildcard.
///
/// `filtered` should be the history after the exclusion step only, so the
/// list does not shrink to whatever is currently selected. The wildcard is
/// always present, even before any message arrives.
pub fn available_topics<'a, I>(filtered: I, prefix: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a Message>,
{
    let wildcard = wildcard(prefix);
    let mut seen: HashSet<&'a str> = HashSet::new();
    let mut topics = Vec::new();

    for message in filtered {
        let topic = message.topic.as_str();
        if topic != wildcard && belongs_to_run(topic, prefix) && seen.insert(topic) {
            topics.push(topic.to_string());
        }
    }

    topics.push(wildcard);
    topics
}
