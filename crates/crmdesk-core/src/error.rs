//! # Error Types
//!
//! Domain-specific error types for crmdesk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  crmdesk-core errors (this file)                                        │
//! │  ├── CoreError        - Table / invoice domain errors                   │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  crmdesk-client errors (separate crate)                                 │
//! │  └── ClientError      - Backend and response failures                   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → Notice (UI)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The table pipeline itself never returns errors: missing fields and type
//! mismatches degrade to empty strings and stable comparisons. Errors only
//! come from state transitions that would make pagination meaningless
//! (zero rows per page) or from malformed entity data.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A name that is not one of the dashboard tables.
    #[error("Unknown entity kind: {0}")]
    UnknownEntityKind(String),

    /// A column key is not part of the entity's accessor table.
    ///
    /// ## When This Occurs
    /// - A header click or condition names a column the entity lacks
    #[error("Unknown column '{column}' for {entity}")]
    UnknownColumn { entity: String, column: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an UnknownColumn error.
    pub fn unknown_column(entity: impl Into<String>, column: impl Into<String>) -> Self {
        CoreError::UnknownColumn {
            entity: entity.into(),
            column: column.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::unknown_column("deal", "colour");
        assert_eq!(err.to_string(), "Unknown column 'colour' for deal");

        let err = CoreError::UnknownEntityKind("contact".to_string());
        assert_eq!(err.to_string(), "Unknown entity kind: contact");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "id".to_string(),
        };
        assert_eq!(err.to_string(), "id is required");

        let err = ValidationError::MustBePositive {
            field: "rows per page".to_string(),
        };
        assert_eq!(err.to_string(), "rows per page must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
