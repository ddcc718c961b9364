//! Form normalization and required-field checks.

use crate::error::CoopError;
use serde_json::{Map, Value};

/// One declared form field. `allow_null == false` marks it required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub allow_null: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            allow_null: false,
        }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            allow_null: true,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Validated {
    pub normalized: Map<String, Value>,
    /// Required fields that ended up absent, in declaration order.
    pub missing: Vec<&'static str>,
}

impl Validated {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn into_result(self) -> Result<Map<String, Value>, CoopError> {
        if self.missing.is_empty() {
            Ok(self.normalized)
        } else {
            Err(CoopError::Validation {
                missing: self.missing.iter().map(|m| m.to_string()).collect(),
            })
        }
    }
}

/// Trim strings; a string that is empty after trimming becomes `null`.
pub fn normalize_value(value: Value) -> Value {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Value::Null
            } else if trimmed.len() == s.len() {
                Value::String(s)
            } else {
                Value::String(trimmed.to_string())
            }
        }
        other => other,
    }
}

pub fn validate(submitted: Map<String, Value>, spec: &[FieldSpec]) -> Validated {
    let normalized: Map<String, Value> = submitted
        .into_iter()
        .map(|(k, v)| (k, normalize_value(v)))
        .collect();

    let missing = spec
        .iter()
        .filter(|field| !field.allow_null)
        .filter(|field| normalized.get(field.name).is_none_or(Value::is_null))
        .map(|field| field.name)
        .collect();

    Validated {
        normalized,
        missing,
    }
}

/// Take a normalized string field out of the map.
pub fn take_string(map: &mut Map<String, Value>, name: &str) -> Option<String> {
    match map.remove(name) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}
