//! Topic conventions for one simulation run.
//!
//! All topics of a run nest under `<prefix>/`. The manager publishes its
//! time status on `<prefix>-manager/time` and applications announce
//! themselves on `<prefix>/logs/info`.

/// Suffix of the manager's time-status topic
pub const MANAGER_TIME_SUFFIX: &str = "-manager/time";

/// Wildcard topic covering the whole run: `<prefix>/#`.
pub fn wildcard(prefix: &str) -> String {
    format!("{}/#", prefix)
}

/// Namespace every run topic contains: `<prefix>/`.
pub fn run_namespace(prefix: &str) -> String {
    format!("{}/", prefix)
}

/// Time-status topic of the run manager: `<prefix>-manager/time`.
pub fn time_status_topic(prefix: &str) -> String {
    format!("{}{}", prefix, MANAGER_TIME_SUFFIX)
}

/// Info topic where applications announce themselves: `<prefix>/logs/info`.
pub fn info_topic(prefix: &str) -> String {
    format!("{}/logs/info", prefix)
}

/// True for manager time-status telemetry from any run.
///
/// These messages drive the status header and are never shown as logs.
pub fn is_time_status_noise(topic: &str) -> bool {
    topic.ends_with(MANAGER_TIME_SUFFIX)
}

/// True if the topic contains the run namespace anywhere.
///
/// This is a substring test, not MQTT subtree matching: `other/run42/x`
/// also belongs to run `run42`.
pub fn belongs_to_run(topic: &str, prefix: &str) -> bool {
    topic.contains(&run_namespace(prefix))
}

/// Role of a topic within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicKind {
    TimeStatus,
    Info,
    Log,
}

/// Classify a topic against the run prefix.
pub fn classify(topic: &str, prefix: &str) -> TopicKind {
    if topic == time_status_topic(prefix) {
        TopicKind::TimeStatus
    } else if topic == info_topic(prefix) {
        TopicKind::Info
    } else {
        TopicKind::Log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conventions() {
        assert_eq!(wildcard("run42"), "run42/#");
        assert_eq!(run_namespace("run42"), "run42/");
        assert_eq!(time_status_topic("run42"), "run42-manager/time");
        assert_eq!(info_topic("run42"), "run42/logs/info");
    }

    #[test]
    fn test_time_status_noise() {
        assert!(is_time_status_noise("run42-manager/time"));
        assert!(is_time_status_noise("other-manager/time"));
        assert!(!is_time_status_noise("run42/manager/time"));
        assert!(!is_time_status_noise("run42-manager/time/extra"));
        assert!(!is_time_status_noise("run42/sat/time"));
    }

    #[test]
    fn test_belongs_to_run_is_substring_match() {
        assert!(belongs_to_run("run42/a", "run42"));
        assert!(belongs_to_run("run42/a/b/c", "run42"));
        assert!(belongs_to_run("mirror/run42/a", "run42"));
        assert!(!belongs_to_run("run42-manager/time", "run42"));
        assert!(!belongs_to_run("run4/a", "run42"));
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("run42-manager/time", "run42"), TopicKind::TimeStatus);
        assert_eq!(classify("run42/logs/info", "run42"), TopicKind::Info);
        assert_eq!(classify("run42/logs/warn", "run42"), TopicKind::Log);
        assert_eq!(classify("other-manager/time", "run42"), TopicKind::Log);
    }
}
