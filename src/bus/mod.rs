// Message bus adapter (MQTT)

mod client;
mod status;

pub use client::{MqttBus, MqttConfig};
pub use status::{ConnectionStatus, LinkEvent};
