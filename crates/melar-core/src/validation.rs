//! # Validation Module
//!
//! Field-level rules that run before any request leaves the client.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE (client side)                                     │
//! │  ├── Required fields, lengths, email/phone shape                        │
//! │  ├── Quantity and price bounds, rental date ranges                      │
//! │  └── Failure blocks submission, reported next to the field              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Backend serializers                                           │
//! │  └── Returns 400 with per-field messages (surfaced as HTTP errors)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use melar_core::validation::{validate_email, validate_quantity};
//!
//! assert!(validate_email("rina@example.com").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use regex::Regex;
use std::sync::OnceLock;

use crate::error::ValidationError;
use crate::money::Money;
use crate::pricing::RentalPeriod;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum password length accepted at registration and password change.
pub const MIN_PASSWORD_LENGTH: usize = 8;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\S+@\S+\.\S+$").expect("static regex"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(62|0)8[0-9]{7,15}$").expect("static regex"))
}

// =============================================================================
// String Validators
// =============================================================================

/// Rejects empty or whitespace-only values.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates an email address shape (`something@host.tld`, no spaces).
pub fn validate_email(email: &str) -> ValidationResult<()> {
    validate_required("email", email)?;
    if !email_regex().is_match(email.trim()) {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        });
    }
    Ok(())
}

/// Validates an Indonesian mobile number.
///
/// ## Rules
/// Non-digits are stripped first, so `+62 812-3456-789` is accepted.
/// The remaining digits must match `(62|0)8` followed by 7 to 15 digits.
///
/// ## Example
/// ```rust
/// use melar_core::validation::validate_phone;
///
/// assert!(validate_phone("0812 3456 789").is_ok());
/// assert!(validate_phone("+62 812-3456-789").is_ok());
/// assert!(validate_phone("12345").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    validate_required("phone", phone)?;
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if !phone_regex().is_match(&digits) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must be an Indonesian mobile number (08xx, 628xx or +628xx)".to_string(),
        });
    }
    Ok(())
}

/// Validates a product name (1-200 characters after trimming).
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a new password's length.
pub fn validate_password(field: &str, password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

/// Validates that a confirmation field repeats the original.
pub fn validate_passwords_match(password: &str, confirmation: &str) -> ValidationResult<()> {
    if password != confirmation {
        return Err(ValidationError::Mismatch {
            field: "password confirmation".to_string(),
            other: "password".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart or order quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a daily price. Zero is allowed (free rentals).
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Date Validators
// =============================================================================

/// Rejects inverted rental periods.
///
/// Pricing would floor an inverted range to one day; the cart refuses it
/// instead so that what the buyer sees is what the backend will charge.
pub fn validate_rental_period(period: &RentalPeriod) -> ValidationResult<()> {
    if period.is_inverted() {
        return Err(ValidationError::InvalidDateRange {
            start: period.start_date,
            end: period.end_date,
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
    use chrono::NaiveDate;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("rina@example.com").is_ok());
        assert!(validate_email(" a@b.co ").is_ok());

        assert!(matches!(
            validate_email(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_email("rina@example"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(validate_email("rina wijaya@example.com").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("081234567").is_ok());
        assert!(validate_phone("6281234567890").is_ok());
        assert!(validate_phone("+62 812 3456 7890").is_ok());

        // must start with 08 / 628
        assert!(validate_phone("0712345678").is_err());
        // too short after the 08 prefix
        assert!(validate_phone("08123").is_err());
        assert!(validate_phone("").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(matches!(
            validate_quantity(0),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            validate_quantity(1000),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(4599)).is_ok());
        assert!(validate_price(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_passwords() {
        assert!(validate_password("password", "longenough").is_ok());
        assert!(matches!(
            validate_password("password", "short"),
            Err(ValidationError::TooShort { min: 8, .. })
        ));
        assert!(validate_passwords_match("abcdefgh", "abcdefgh").is_ok());
        assert!(matches!(
            validate_passwords_match("abcdefgh", "abcdefgx"),
            Err(ValidationError::Mismatch { .. })
        ));
    }

    #[test]
    fn test_validate_rental_period() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        assert!(validate_rental_period(&RentalPeriod::new(d(1), d(1))).is_ok());
        assert!(validate_rental_period(&RentalPeriod::new(d(1), d(5))).is_ok());
        assert!(matches!(
            validate_rental_period(&RentalPeriod::new(d(5), d(1))),
            Err(ValidationError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Tenda Dome 4P").is_ok());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"x".repeat(201)).is_err());
    }
}
