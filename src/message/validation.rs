use std::fmt;

/// Validation errors for topics and prefixes entered by users
#[derive(Debug, Clone, PartialEq)]
pub enum TopicError {
    Empty,
    ContainsWildcard(String),
    ContainsNull(String),
    InvalidPrefix(String),
}

impl fmt::Display for TopicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicError::Empty => write!(f, "topic must not be empty"),
            TopicError::ContainsWildcard(t) => {
                write!(f, "invalid topic '{}': wildcards are only allowed as '<prefix>/#'", t)
            }
            TopicError::ContainsNull(t) => {
                write!(f, "invalid topic '{}': contains a NUL character", t.escape_default())
            }
            TopicError::InvalidPrefix(p) => {
                write!(f, "invalid prefix '{}': must be a single topic segment", p)
            }
        }
    }
}

impl std::error::Error for TopicError {}

/// Validates a concrete topic name.
///
/// Valid topic names:
/// - Not empty
/// - No `+` or `#` wildcard characters
/// - No NUL characters
pub fn validate_topic(topic: &str) -> Result<(), TopicError> {
    if topic.is_empty() {
        return Err(TopicError::Empty);
    }
    if topic.contains('\0') {
        return Err(TopicError::ContainsNull(topic.to_string()));
    }
    if topic.contains(['+', '#']) {
        return Err(TopicError::ContainsWildcard(topic.to_string()));
    }
    Ok(())
}

/// Validates a run prefix.
///
/// A prefix is one topic segment: non-empty, no `/`, no wildcards, no whitespace.
pub fn validate_prefix(prefix: &str) -> Result<(), TopicError> {
    let well_formed = !prefix.is_empty()
        && !prefix.contains(['/', '+', '#', '\0'])
        && !prefix.chars().any(char::is_whitespace);

    if well_formed {
        Ok(())
    } else {
        Err(TopicError::InvalidPrefix(prefix.to_string()))
    }
}
