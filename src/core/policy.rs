// Authors: Robert Lopez

use crate::error::Error;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};

/// A POST policy document restricting what a signed form may upload.
///
/// Serializes to
/// `{"expiration": "...", "conditions": [["content-length-range", min, max], {"name": "value"}, ...]}`.
#[derive(Debug, Clone, PartialEq)]
pub struct PostPolicy {
    pub expiration: DateTime<Utc>,
    pub content_length_range: (u64, u64),
    pub conditions: Vec<(String, String)>,
}

impl PostPolicy {
    pub fn new(expiration: DateTime<Utc>, content_length_min: u64, content_length_max: u64) -> Self {
        Self {
            expiration,
            content_length_range: (content_length_min, content_length_max),
            conditions: vec![],
        }
    }

    /// Adds an exact match condition on a form field.
    pub fn add_equals_condition(&mut self, name: &str, value: &str) {
        self.conditions.push((name.to_string(), value.to_string()));
    }

    pub fn to_json(&self) -> Value {
        let (min, max) = self.content_length_range;

        let mut conditions = vec![json!(["content-length-range", min, max])];

        for (name, value) in &self.conditions {
            let mut condition = Map::new();
            condition.insert(name.clone(), Value::String(value.clone()));
            conditions.push(Value::Object(condition));
        }

        json!({
            "expiration": self.expiration.to_rfc3339_opts(SecondsFormat::Millis, true),
            "conditions": conditions,
        })
    }

    /// Base64 of the JSON document, the value sent as the `Policy` field
    /// and the string that gets signed.
    pub fn to_base64(&self) -> Result<String, Error> {
        let policy_json = serde_json::to_string(&self.to_json())
            .map_err(|err| Error::Signing(err.to_string()))?;

        Ok(STANDARD.encode(policy_json.as_bytes()))
    }
}
