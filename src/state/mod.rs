// Message ingestion, filtering and derived console state

mod buffer;
mod engine;
mod filter;
mod handle;
mod nodes;
mod registry;
mod status;
mod view;

pub use buffer::IngestionBuffer;
pub use engine::{Ingested, Monitor, MonitorError};
pub use filter::{compute_display, passes_exclusion};
pub(crate) use filter::Selection;
pub use handle::{MonitorHandle, MonitorUpdate};
pub use nodes::NodeDiscovery;
pub use registry::available_topics;
pub use status::StatusExtractor;
pub use view::{LogView, DEFAULT_MAX_COUNT};

#[cfg(test)]
mod tests;
