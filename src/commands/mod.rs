// Manager command API: request types, HTTP client, call log

mod client;
mod console;
mod form;
mod log;
mod request;
mod validation;

pub use client::{CommandError, ManagerApiConfig, ManagerClient};
pub use console::{CommandConsole, CommandStatus, LastCommandStatus, STATUS_BANNER_SECONDS};
pub use form::{CommandForm, FormError};
pub use log::{ApiCallRecord, ApiLog, CallOutcome};
pub use request::{
    CommandKind, CommandRequest, InitRequest, StartRequest, StopRequest, UpdateRequest,
};
pub use validation::{parse_command_time, TimeInputError};
