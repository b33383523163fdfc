//! # Error Types
//!
//! Domain-specific error types for melar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  melar-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input rejected before any request is sent       │
//! │                                                                         │
//! │  melar-store errors   └── StoreError   - Local persistence failures     │
//! │  melar-client errors  └── ClientError  - Transport / HTTP / decode      │
//! │  melar-app errors     └── AppError     - What the user sees             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                   │
//! │        StoreError ─────────────────┼──► AppError → user message        │
//! │        ClientError ────────────────┘                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use thiserror::Error;

use crate::status::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Cart line cannot be found.
    ///
    /// ## When This Occurs
    /// - Quantity change or removal for a line that was already removed
    /// - A stale line id from a previous cart snapshot
    #[error("Cart line not found: {0}")]
    CartLineNotFound(String),

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A line or cart total does not fit the money range.
    ///
    /// ## When This Occurs
    /// - A huge daily price rented over centuries at high quantity
    /// - Many such lines summed into one subtotal
    #[error("Amount too large: {field} cannot be priced")]
    AmountTooLarge { field: String },

    /// Checkout was attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// The requested status change is not permitted by the order state machine.
    ///
    /// ## When This Occurs
    /// ```text
    /// completed ──► active      (terminal states never move)
    /// active    ──► confirmed   (no moving backwards)
    /// active    ──► cancelled   (buyer cancel only before the rental starts)
    /// ```
    #[error("Order cannot move from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    /// Buyer asked to cancel an order that is past the cancellable window.
    #[error("Order with status \"{status}\" cannot be cancelled")]
    CancelNotAllowed { status: OrderStatus },

    /// Backend sent a status string this client does not know.
    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before a request is sent. Every variant names the offending field
/// so a form can show the message next to it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Invalid format (email, phone, decimal amount, date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Two fields that must agree do not (password confirmation).
    #[error("{field} does not match {other}")]
    Mismatch { field: String, other: String },

    /// Rental end date falls before the start date.
    #[error("End date {end} cannot be before start date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

impl ValidationError {
    /// Name of the field the error belongs to, for inline display.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::Negative { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::Mismatch { field, .. } => field,
            ValidationError::InvalidDateRange { .. } => "rental_period",
        }
    }
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
        let err = CoreError::InvalidStatusTransition {
            from: OrderStatus::Completed,
            to: OrderStatus::Active,
        };
        assert_eq!(err.to_string(), "Order cannot move from completed to active");

        let err = CoreError::CancelNotAllowed {
            status: OrderStatus::Active,
        };
        assert_eq!(
            err.to_string(),
            "Order with status \"active\" cannot be cancelled"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "email".to_string(),
        };
        assert_eq!(err.to_string(), "email is required");
        assert_eq!(err.field(), "email");

        let err = ValidationError::InvalidDateRange {
            start: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "End date 2024-01-01 cannot be before start date 2024-01-03"
        );
        assert_eq!(err.field(), "rental_period");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "first_name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
