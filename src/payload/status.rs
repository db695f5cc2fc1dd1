use super::PayloadError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Latest time status reported by the run manager.
///
/// Replaced wholesale on every time-status message, never merged.
/// Expected payload shape:
/// ```json
/// {"name": "manager", "properties": {"simTime": "...", "time": "...", "timeScalingFactor": 60.0}}
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// Scenario time as reported (ISO-8601), blank if absent
    pub sim_time: Option<String>,

    /// Wall-clock time as reported (ISO-8601), blank if absent
    pub time: Option<String>,

    pub time_scaling_factor: Option<f64>,
}

impl Status {
    pub(crate) fn from_payload(topic: &str, payload: &Value) -> Result<Self, PayloadError> {
        let object = payload.as_object().ok_or_else(|| PayloadError::NotAnObject {
            topic: topic.to_string(),
        })?;

        let properties = object.get("properties").and_then(Value::as_object);
        let field = |name: &str| properties.and_then(|p| p.get(name));

        Ok(Self {
            sim_time: field("simTime").and_then(Value::as_str).map(str::to_string),
            time: field("time").and_then(Value::as_str).map(str::to_string),
            time_scaling_factor: field("timeScalingFactor").and_then(Value::as_f64),
        })
    }

    /// True while no simulation time has been reported.
    pub fn is_idle(&self) -> bool {
        self.sim_time.as_deref().map_or(true, str::is_empty)
    }

    /// Simulation time trimmed to whole seconds for the header.
    pub fn sim_time_display(&self) -> Option<&str> {
        let sim_time = self.sim_time.as_deref().filter(|s| !s.is_empty())?;
        match sim_time.char_indices().nth(19) {
            Some((end, _)) => Some(&sim_time[..end]),
            None => Some(sim_time),
        }
    }

    /// One-line header text.
    pub fn header_text(&self) -> String {
        match self.sim_time_display() {
            None => "Simulation Not Running".to_string(),
            Some(sim_time) => {
                let factor = self
                    .time_scaling_factor
                    .map(|f| f.to_string())
                    .unwrap_or_default();
                format!(
                    "Simulation Time: {} | Time Scaling Factor: {}",
                    sim_time, factor
                )
            }
        }
    }
}
