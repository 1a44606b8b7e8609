use std::io;
use thiserror::Error;

use super::traits::HandleId;

/// Failures talking to the message transport
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Topic not found: {0}")]
    TopicNotFound(String),

    #[error("Unknown or already released handle: {0}")]
    UnknownHandle(HandleId),

    #[error("Topic closed: {0}")]
    Closed(String),

    #[error("Transport rejected request: {0}")]
    Rejected(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        assert_eq!(
            TransportError::TopicNotFound("orders".to_string()).to_string(),
            "Topic not found: orders"
        );
        assert_eq!(
            TransportError::UnknownHandle(HandleId(7)).to_string(),
            "Unknown or already released handle: #7"
        );
        assert_eq!(
            TransportError::Closed("alerts".to_string()).to_string(),
            "Topic closed: alerts"
        );
    }

    #[test]
    fn io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "pipe");
        match TransportError::from(io_err) {
            TransportError::Io(_) => {}
            other => panic!("Expected Io variant, got {other:?}"),
        }
    }
}
