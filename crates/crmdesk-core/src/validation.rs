//! # Validation Module
//!
//! Input checks applied before state changes or backend requests.
//!
//! ## Where Checks Happen
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Points                                  │
//! │                                                                         │
//! │  Table footer                                                           │
//! │  └── page size selector ──► validate_rows_per_page    (rejects)         │
//! │                                                                         │
//! │  Entity repository                                                      │
//! │  └── update / delete ─────► validate_record_id        (rejects)         │
//! │                                                                         │
//! │  Invoice dialog                                                         │
//! │  └── InvoiceForm::issues ─► validate_percentage       (reports only)    │
//! │                                                                         │
//! │  Search text and conditions are never rejected.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::MAX_ROWS_PER_PAGE;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Table Input
// =============================================================================

/// Validates a page size.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_ROWS_PER_PAGE`]
///
/// ```rust
/// use crmdesk_core::validation::validate_rows_per_page;
///
/// assert!(validate_rows_per_page(25).is_ok());
/// assert!(validate_rows_per_page(0).is_err());
/// ```
pub fn validate_rows_per_page(rows_per_page: usize) -> ValidationResult<()> {
    if rows_per_page == 0 {
        return Err(ValidationError::MustBePositive {
            field: "rows per page".to_string(),
        });
    }

    if rows_per_page > MAX_ROWS_PER_PAGE {
        return Err(ValidationError::OutOfRange {
            field: "rows per page".to_string(),
            min: 1,
            max: MAX_ROWS_PER_PAGE as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Record Input
// =============================================================================

/// Validates a record id before an update or delete.
pub fn validate_record_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    Ok(())
}

/// Validates a percentage entered in the invoice dialog.
///
/// The calculator accepts any number. [`crate::gst::InvoiceForm::issues`]
/// reports failures from this check without blocking the totals.
pub fn validate_percentage(field: &str, pct: f64) -> ValidationResult<()> {
    if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rows_per_page() {
        assert!(validate_rows_per_page(1).is_ok());
        assert!(validate_rows_per_page(MAX_ROWS_PER_PAGE).is_ok());
        assert_eq!(
            validate_rows_per_page(0),
            Err(ValidationError::MustBePositive {
                field: "rows per page".to_string()
            })
        );
        assert!(matches!(
            validate_rows_per_page(MAX_ROWS_PER_PAGE + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_record_id() {
        assert!(validate_record_id("64b7f0c2").is_ok());
        assert!(validate_record_id("").is_err());
        assert!(validate_record_id("   ").is_err());
    }

    #[test]
    fn test_validate_percentage() {
        assert!(validate_percentage("discount", 0.0).is_ok());
        assert!(validate_percentage("discount", 100.0).is_ok());
        assert!(validate_percentage("discount", 100.5).is_err());
        assert!(validate_percentage("gst rate", -1.0).is_err());
        assert!(validate_percentage("gst rate", f64::NAN).is_err());
    }
}
