//! ResultLoader - Tolerant decoding of captured outputs and answers
//!
//! Decoding never fails loudly. Anything that cannot be read or parsed comes
//! back as [`Loaded::Undecodable`] with the reason attached, and surfaces
//! later as a mismatch.
//!
//! Documents are tried as JSON first. If that fails, YAML is tried, but a YAML
//! result only counts when it is a sequence: free-form text such as an error
//! message would otherwise decode as a YAML scalar or mapping. A JSON object
//! that repeats a key keeps the last value.

use std::fs;
use std::path::Path;

/// Generic decoded document. Mapping keys may be any scalar until normalized.
pub type Value = serde_yaml::Value;

/// A document after a decode attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded {
    /// Decoded structured data
    Decoded(Value),
    /// Could not be decoded, with the reason
    Undecodable(String),
}

impl Loaded {
    /// Returns true if decoding succeeded
    pub fn is_decoded(&self) -> bool {
        matches!(self, Loaded::Decoded(_))
    }

    /// The decoded value, if any
    pub fn value(&self) -> Option<&Value> {
        match self {
            Loaded::Decoded(value) => Some(value),
            Loaded::Undecodable(_) => None,
        }
    }

    /// Why decoding failed, if it did
    pub fn reason(&self) -> Option<&str> {
        match self {
            Loaded::Decoded(_) => None,
            Loaded::Undecodable(reason) => Some(reason),
        }
    }
}

/// Read and decode the document at `path`.
pub fn load_document(path: impl AsRef<Path>) -> Loaded {
    let path = path.as_ref();
    match fs::read(path) {
        Ok(bytes) => {
            let loaded = decode_bytes(&bytes);
            if let Some(reason) = loaded.reason() {
                tracing::debug!(path = %path.display(), reason, "document is undecodable");
            }
            loaded
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "document is unreadable");
            Loaded::Undecodable(format!("cannot read {}: {e}", path.display()))
        }
    }
}

/// Decode raw bytes as JSON, falling back to a YAML sequence.
pub fn decode_bytes(bytes: &[u8]) -> Loaded {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Loaded::Undecodable("empty document".to_string());
    }

    let json_err = match serde_json::from_slice::<serde_json::Value>(bytes) {
        Ok(value) => return Loaded::Decoded(from_json(value)),
        Err(e) => e,
    };

    let Ok(text) = std::str::from_utf8(bytes) else {
        return Loaded::Undecodable(format!("invalid JSON ({json_err}) and not UTF-8"));
    };
    match serde_yaml::from_str::<Value>(text) {
        Ok(value @ Value::Sequence(_)) => Loaded::Decoded(value),
        Ok(other) => Loaded::Undecodable(format!(
            "invalid JSON ({json_err}); YAML fallback gave a {} instead of a sequence",
            kind_name(&other)
        )),
        Err(yaml_err) => Loaded::Undecodable(format!(
            "invalid JSON ({json_err}); invalid YAML ({yaml_err})"
        )),
    }
}

/// Convert a JSON tree. Objects have already collapsed repeated keys, last one
/// winning.
fn from_json(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Value::from(u)
            } else if let Some(i) = n.as_i64() {
                Value::from(i)
            } else {
                n.as_f64().map_or(Value::Null, Value::from)
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::Sequence(items.into_iter().map(from_json).collect())
        }
        serde_json::Value::Object(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| (Value::String(k), from_json(v)))
                .collect(),
        ),
    }
}

/// Human name of a value's kind, for diagnostics.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
