use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use std::fmt;

/// Datetime input rejected by [`parse_command_time`]
#[derive(Debug, Clone, PartialEq)]
pub struct TimeInputError {
    pub field: String,
    pub value: String,
}

impl fmt::Display for TimeInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid datetime '{}' for {}: expected YYYY-MM-DDTHH:MM:SS[.mmm][Z]",
            self.value, self.field
        )
    }
}

impl std::error::Error for TimeInputError {}

/// Parse a command datetime input.
///
/// Accepted shape: `YYYY-MM-DDTHH:MM:SS`, optionally followed by exactly
/// three fractional digits, optionally followed by `Z`. Times are UTC.
pub fn parse_command_time(field: &str, value: &str) -> Result<DateTime<Utc>, TimeInputError> {
    let invalid = || TimeInputError {
        field: field.to_string(),
        value: value.to_string(),
    };

    let trimmed = value.strip_suffix('Z').unwrap_or(value);
    let (base, millis) = match trimmed.split_once('.') {
        Some((base, fraction)) => {
            if fraction.len() != 3 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            (base, fraction.parse::<i64>().map_err(|_| invalid())?)
        }
        None => (trimmed, 0),
    };

    if base.len() != 19 || !base.is_ascii() {
        return Err(invalid());
    }

    let naive = NaiveDateTime::parse_from_str(base, "%Y-%m-%dT%H:%M:%S").map_err(|_| invalid())?;
    Ok(naive.and_utc() + Duration::milliseconds(millis))
}
