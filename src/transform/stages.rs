//! Reusable stage functions over JSON object values

use serde_json::{Map, Value};

use super::error::TransformError;
use crate::domain::Record;

/// Predicate: numeric `field` of the value is `>= min`
pub fn field_at_least(
    field: &str,
    min: f64,
) -> impl Fn(&Record) -> Result<bool, TransformError> + Send + Sync + 'static {
    let field = field.to_string();
    move |record| {
        let value = record
            .field(&field)
            .ok_or_else(|| TransformError::MissingField(field.clone()))?;
        let number = value.as_f64().ok_or_else(|| TransformError::InvalidValue {
            field: field.clone(),
            expected: "number",
        })?;
        Ok(number >= min)
    }
}

/// Map: keep only the listed fields of an object value
///
/// Absent fields are skipped; a non-object value is an error.
pub fn select_fields(
    fields: &[&str],
) -> impl Fn(Record) -> Result<Record, TransformError> + Send + Sync + 'static {
    let fields: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
    move |record| {
        let Value::Object(mut object) = record.value else {
            return Err(TransformError::InvalidValue {
                field: "value".to_string(),
                expected: "object",
            });
        };
        let selected: Map<String, Value> = fields
            .iter()
            .filter_map(|name| object.remove(name).map(|v| (name.clone(), v)))
            .collect();
        Ok(Record {
            key: record.key,
            value: Value::Object(selected),
        })
    }
}
