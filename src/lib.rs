// Bus messages and topic validation
pub mod message;

// Topic naming conventions of a run
pub mod topic;

// Time status and node announcement payloads
pub mod payload;

// Ingestion, filtering and session state
pub mod state;

// MQTT bus adapter
pub mod bus;

// Manager command API
pub mod commands;

// Persisted console settings
pub mod settings;

// Log export
pub mod export;

// Configuration
pub mod config;

// HTTP and WebSocket APIs
pub mod api;

// Subscription management
pub mod subscription;
