use thiserror::Error;

/// Failure raised by a stage function while processing a record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("Transform failed: {0}")]
    Failed(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: expected {expected}")]
    InvalidValue { field: String, expected: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        assert_eq!(
            TransformError::Failed("bad record".to_string()).to_string(),
            "Transform failed: bad record"
        );
        assert_eq!(
            TransformError::MissingField("amount".to_string()).to_string(),
            "Missing field: amount"
        );
        assert_eq!(
            TransformError::InvalidValue {
                field: "amount".to_string(),
                expected: "number",
            }
            .to_string(),
            "Invalid value for amount: expected number"
        );
    }
}
