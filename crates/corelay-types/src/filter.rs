//! Structural filters for selecting event frames.
//!
//! A [`Filter`] is a partial pattern over a JSON object payload: every key
//! in the filter must be present in the payload with an equal value. Keys
//! the filter does not mention are ignored, so `{"cmd": "pong"}` matches
//! `{"cmd": "pong", "seq": 1}`. Partial matching applies at the top level
//! only; nested values compare by deep equality.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors from filter construction.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("filter must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// A partial structural pattern matched against frame payloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(Map<String, Value>);

impl Filter {
    /// The empty filter, which matches every payload.
    pub fn empty() -> Self {
        Self(Map::new())
    }

    /// Build a filter from key/value criteria.
    pub fn new(criteria: Map<String, Value>) -> Self {
        Self(criteria)
    }

    /// Number of keys the filter constrains.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every key in the filter is present in `payload` with an
    /// equal value.
    ///
    /// Payload keys the filter does not mention are ignored; a missing key
    /// is a non-match. The empty filter matches anything, including
    /// non-object payloads; a non-empty filter never matches a non-object
    /// payload.
    pub fn matches(&self, payload: &Value) -> bool {
        if self.0.is_empty() {
            return true;
        }
        let Value::Object(fields) = payload else {
            return false;
        };
        self.0.iter().all(|(key, want)| fields.get(key) == Some(want))
    }
}

impl From<Map<String, Value>> for Filter {
    fn from(criteria: Map<String, Value>) -> Self {
        Self(criteria)
    }
}

impl TryFrom<Value> for Filter {
    type Error = FilterError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(criteria) => Ok(Self(criteria)),
            Value::Null => Err(FilterError::NotAnObject("null")),
            Value::Bool(_) => Err(FilterError::NotAnObject("a boolean")),
            Value::Number(_) => Err(FilterError::NotAnObject("a number")),
            Value::String(_) => Err(FilterError::NotAnObject("a string")),
            Value::Array(_) => Err(FilterError::NotAnObject("an array")),
        }
    }
}
