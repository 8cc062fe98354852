//! # Client Error Types
//!
//! Error types for backend calls, response handling and configuration.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  RecordBackend call fails / returns junk                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ClientError (this module) ← categorized                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  EntityStore turns it into a Notice (never panics, never bubbles up)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Dashboard shows a toast                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crmdesk_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Client error type.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// The backend could not be reached or the request failed in transit.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The backend answered with something we cannot interpret.
    ///
    /// ## When This Occurs
    /// - List body is neither `{ "data": [...] }` nor a bare array
    /// - Mutation reply is not a JSON object
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The backend answered a mutation with an `error` field.
    #[error("{0}")]
    Rejected(String),

    /// Record does not exist on the backend.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Failed to serialize a request body.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    // =========================================================================
    // Domain Errors
    // =========================================================================
    /// Input rejected before any request was made.
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

impl ClientError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        ClientError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Returns true if retrying the same request might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::RequestFailed(_))
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::Core(CoreError::Validation(err))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::SerializationFailed(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::RequestFailed(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(ClientError::RequestFailed("connection reset".into()).is_retryable());
        assert!(!ClientError::Rejected("Invoice number taken".into()).is_retryable());
        assert!(!ClientError::MalformedResponse("expected array".into()).is_retryable());
    }

    #[test]
    fn test_rejected_shows_backend_message() {
        let err = ClientError::Rejected("Lead already exists".into());
        assert_eq!(err.to_string(), "Lead already exists");
    }

    #[test]
    fn test_validation_converts_through_core() {
        let err: ClientError = ValidationError::Required {
            field: "id".to_string(),
        }
        .into();
        assert!(matches!(err, ClientError::Core(CoreError::Validation(_))));
        assert_eq!(err.to_string(), "Validation error: id is required");
    }

    #[test]
    fn test_config_errors() {
        assert!(ClientError::InvalidConfig("x".into()).is_config_error());
        assert!(!ClientError::not_found("lead", "1").is_config_error());
    }
}
