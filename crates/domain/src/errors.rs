//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for schedlink
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum SchedlinkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid state token: {0}")]
    InvalidState(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Not connected: {0}")]
    NotConnected(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for schedlink operations
pub type Result<T> = std::result::Result<T, SchedlinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_serialize_as_tagged_variants() {
        let err = SchedlinkError::InvalidState("signature mismatch".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"type\":\"InvalidState\""));
        assert!(json.contains("signature mismatch"));
    }

    #[test]
    fn error_display_includes_context() {
        let err = SchedlinkError::NotConnected("emp-1/google".to_string());
        assert_eq!(err.to_string(), "Not connected: emp-1/google");
    }
}
