use super::request::{
    CommandKind, CommandRequest, InitRequest, StartRequest, StopRequest, UpdateRequest,
};
use super::validation::{parse_command_time, TimeInputError};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

/// Raw command inputs as typed into the console.
///
/// Datetimes arrive as strings and are validated before anything is sent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandForm {
    pub sim_start_time: Option<String>,
    pub sim_stop_time: Option<String>,
    pub start_time: Option<String>,
    pub time_step: Option<f64>,
    pub time_scale_factor: Option<f64>,
    pub time_status_step: Option<f64>,
    pub time_status_init: Option<String>,
    pub sim_update_time: Option<String>,
    #[serde(default)]
    pub required_apps: Vec<String>,
}

/// Command inputs that cannot be turned into a request
#[derive(Debug, Clone, PartialEq)]
pub enum FormError {
    Missing(&'static str),
    Time(TimeInputError),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::Missing(field) => write!(f, "missing required field {}", field),
            FormError::Time(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for FormError {}

impl From<TimeInputError> for FormError {
    fn from(e: TimeInputError) -> Self {
        FormError::Time(e)
    }
}

fn required(field: &'static str, value: &Option<String>) -> Result<DateTime<Utc>, FormError> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(parse_command_time(field, v)?),
        _ => Err(FormError::Missing(field)),
    }
}

fn optional(field: &'static str, value: &Option<String>) -> Result<Option<DateTime<Utc>>, FormError> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(Some(parse_command_time(field, v)?)),
        _ => Ok(None),
    }
}

impl CommandForm {
    /// Build the request for `kind`.
    ///
    /// `start` fills the console's usual defaults: wallclock start and
    /// status init at the simulation start, one second steps, real time.
    pub fn into_request(self, kind: CommandKind) -> Result<CommandRequest, FormError> {
        let request = match kind {
            CommandKind::Init => CommandRequest::Init(InitRequest {
                sim_start_time: required("simStartTime", &self.sim_start_time)?,
                sim_stop_time: required("simStopTime", &self.sim_stop_time)?,
                required_apps: self.required_apps,
            }),
            CommandKind::Start => {
                let sim_start_time = required("simStartTime", &self.sim_start_time)?;
                CommandRequest::Start(StartRequest {
                    sim_start_time,
                    sim_stop_time: required("simStopTime", &self.sim_stop_time)?,
                    start_time: Some(
                        optional("startTime", &self.start_time)?.unwrap_or(sim_start_time),
                    ),
                    time_step: Some(self.time_step.unwrap_or(1.0)),
                    time_scale_factor: self.time_scale_factor.unwrap_or(1.0),
                    time_status_step: Some(self.time_status_step.unwrap_or(0.0)),
                    time_status_init: Some(
                        optional("timeStatusInit", &self.time_status_init)?
                            .unwrap_or(sim_start_time),
                    ),
                })
            }
            CommandKind::Stop => CommandRequest::Stop(StopRequest {
                sim_stop_time: required("simStopTime", &self.sim_stop_time)?,
            }),
            CommandKind::Update => CommandRequest::Update(UpdateRequest {
                time_scale_factor: self
                    .time_scale_factor
                    .ok_or(FormError::Missing("timeScaleFactor"))?,
                sim_update_time: required("simUpdateTime", &self.sim_update_time)?,
            }),
        };
        Ok(request)
    }
}
