//! Normalizer - Makes the canonical mapping's keys comparison-stable
//!
//! Targets may emit memory addresses as integers or as strings, depending on
//! the serializer they use. Each record's canonical mapping is rewritten so
//! every key is a string; everything else is left alone.

use std::fmt;

use serde_yaml::Mapping;

use super::loader::{Loaded, Value, kind_name};

/// A document that does not have the state-record shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeError {
    /// What was wrong, naming the record index where it applies
    pub reason: String,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for ShapeError {}

/// Rewrites the keys of one named attribute in every record
#[derive(Debug, Clone)]
pub struct Normalizer {
    canonical_key: String,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new("MEM")
    }
}

impl Normalizer {
    /// Create a normalizer for the given attribute name
    pub fn new(canonical_key: impl Into<String>) -> Self {
        Self {
            canonical_key: canonical_key.into(),
        }
    }

    /// Name of the canonical attribute
    pub fn canonical_key(&self) -> &str {
        &self.canonical_key
    }

    /// Normalize a loaded document.
    ///
    /// Undecodable documents pass through unchanged. The input is never
    /// modified, so on error the caller still holds the offending value.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError`] if the document is not a sequence of mappings
    /// that each carry a mapping under the canonical attribute, or if a
    /// canonical key is a sequence or mapping.
    pub fn normalize(&self, loaded: &Loaded) -> Result<Loaded, ShapeError> {
        match loaded {
            Loaded::Undecodable(_) => Ok(loaded.clone()),
            Loaded::Decoded(value) => self.normalize_value(value).map(Loaded::Decoded),
        }
    }

    /// Normalize a decoded sequence of state records.
    pub fn normalize_value(&self, value: &Value) -> Result<Value, ShapeError> {
        let Value::Sequence(records) = value else {
            return Err(shape(format!(
                "expected a sequence of state records, got a {}",
                kind_name(value)
            )));
        };

        records
            .iter()
            .enumerate()
            .map(|(index, record)| self.normalize_record(index, record))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Sequence)
    }

    fn normalize_record(&self, index: usize, record: &Value) -> Result<Value, ShapeError> {
        let Value::Mapping(attributes) = record else {
            return Err(shape(format!(
                "record {index} is a {}, expected a mapping",
                kind_name(record)
            )));
        };

        let key = self.canonical_key.as_str();
        let canonical = attributes.get(key).ok_or_else(|| {
            shape(format!("record {index} has no `{key}` attribute"))
        })?;
        let Value::Mapping(entries) = canonical else {
            return Err(shape(format!(
                "record {index}: `{key}` is a {}, expected a mapping",
                kind_name(canonical)
            )));
        };

        let mut rewritten = Mapping::with_capacity(entries.len());
        for (k, v) in entries {
            let text = key_string(k)
                .ok_or_else(|| shape(format!("record {index}: `{key}` has a {} key", kind_name(k))))?;
            rewritten.insert(Value::String(text), v.clone());
        }

        let mut attributes = attributes.clone();
        attributes.insert(Value::String(key.to_string()), Value::Mapping(rewritten));
        Ok(Value::Mapping(attributes))
    }
}

/// String form of a scalar mapping key; `None` for sequences and mappings.
pub fn key_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Tagged(tagged) => key_string(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn shape(reason: String) -> ShapeError {
    ShapeError { reason }
}
