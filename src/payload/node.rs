use super::PayloadError;
use serde::Serialize;
use serde_json::Value;

/// A system component announced on the run's info topic.
///
/// The full record is kept as received; equality is structural over the
/// whole record, with numbers compared by value (`1` equals `1.0`).
#[derive(Clone, Debug, Serialize)]
#[serde(transparent)]
pub struct Node {
    record: Value,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        structurally_eq(&self.record, &other.record)
    }
}

fn structurally_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| structurally_eq(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| structurally_eq(x, y)))
        }
        _ => a == b,
    }
}

impl Node {
    pub(crate) fn from_payload(topic: &str, payload: &Value) -> Result<Self, PayloadError> {
        if !payload.is_object() {
            return Err(PayloadError::NotAnObject {
                topic: topic.to_string(),
            });
        }
        Ok(Self {
            record: payload.clone(),
        })
    }

    pub fn record(&self) -> &Value {
        &self.record
    }

    pub fn name(&self) -> Option<&str> {
        self.record.get("name").and_then(Value::as_str)
    }

    pub fn description(&self) -> Option<&str> {
        self.record.get("description").and_then(Value::as_str)
    }

    /// Resource URL under `properties.resource`, only if it is an http(s) link.
    pub fn resource(&self) -> Option<&str> {
        self.record
            .pointer("/properties/resource")
            .and_then(Value::as_str)
            .filter(|r| r.starts_with("http"))
    }
}
