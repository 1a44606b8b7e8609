use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single `{key, value}` pair flowing through a topology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub key: Value,
    pub value: Value,
}

impl Record {
    /// Create a record from anything convertible into JSON values
    pub fn new(key: impl Into<Value>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Look up a top-level field of an object value
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.value.get(name)
    }
}
