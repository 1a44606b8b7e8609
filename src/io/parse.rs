use serde::Deserialize;
use serde_json::Value;

use crate::domain::Record;

/// Raw CSV row as read from an experiment input file
#[derive(Debug, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

impl RawRecord {
    /// Interpret each cell as JSON, falling back to a plain string
    ///
    /// Empty or missing cells become `null`.
    pub fn into_record(self) -> Record {
        Record {
            key: parse_cell(self.key),
            value: parse_cell(self.value),
        }
    }
}

fn parse_cell(cell: Option<String>) -> Value {
    match cell {
        None => Value::Null,
        Some(text) if text.trim().is_empty() => Value::Null,
        Some(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
    }
}
