use crate::payload::Status;

/// Holds the latest manager time status.
///
/// Last write wins: each new status replaces the previous one wholesale, so
/// fields missing from the newest payload are blank rather than carried over.
#[derive(Debug, Default)]
pub struct StatusExtractor {
    current: Status,
}

impl StatusExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &Status {
        &self.current
    }

    /// Replace the current status, returning it.
    pub fn replace(&mut self, status: Status) -> &Status {
        self.current = status;
        &self.current
    }
}
