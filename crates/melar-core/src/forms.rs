//! # Forms
//!
//! Payloads the user fills in, each with the checks that must pass before it
//! is sent. Field names match what the backend expects, so a validated form
//! serializes straight into a request body.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{
    validate_email, validate_password, validate_passwords_match, validate_phone, validate_price,
    validate_product_name, validate_required, ValidationResult,
};

// =============================================================================
// Checkout
// =============================================================================

/// Contact and billing details entered at checkout.
///
/// Every field is required. The email and phone must also be well-formed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl BillingDetails {
    /// All field errors, in form order, for inline display.
    pub fn field_errors(&self) -> Vec<ValidationError> {
        let required = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("zip", &self.zip),
        ];

        let mut errors: Vec<ValidationError> = required
            .iter()
            .filter_map(|(field, value)| validate_required(field, value).err())
            .collect();
        errors.extend(validate_email(&self.email).err());
        errors.extend(validate_phone(&self.phone).err());
        errors
    }

    /// First failing check, if any.
    pub fn validate(&self) -> ValidationResult<()> {
        match self.field_errors().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Single-line shipping address.
    pub fn address_line(&self) -> String {
        format!("{}, {}, {}, {}", self.address, self.city, self.state, self.zip)
    }
}

// =============================================================================
// Authentication
// =============================================================================

/// Login with either a username or an email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub login: String,
    pub password: String,
}

/// Body for `/auth/login/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password: String,
}

impl LoginForm {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        LoginForm {
            login: login.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("login", &self.login)?;
        validate_required("password", &self.password)
    }

    /// Sends an `@`-containing login as `email`, anything else as `username`.
    pub fn payload(&self) -> LoginPayload {
        let login = self.login.trim().to_string();
        let (username, email) = if login.contains('@') {
            (None, Some(login))
        } else {
            (Some(login), None)
        };
        LoginPayload {
            username,
            email,
            password: self.password.clone(),
        }
    }
}

/// Body for `/auth/registration/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password1: String,
    pub password2: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("username", &self.username)?;
        validate_email(&self.email)?;
        validate_password("password", &self.password1)?;
        validate_passwords_match(&self.password1, &self.password2)
    }
}

/// Body for `/auth/password/change/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordChangeForm {
    pub old_password: String,
    pub new_password1: String,
    pub new_password2: String,
}

impl PasswordChangeForm {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("old_password", &self.old_password)?;
        validate_password("new_password", &self.new_password1)?;
        validate_passwords_match(&self.new_password1, &self.new_password2)
    }
}

/// Body for `PATCH /auth/user/`. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }
}

// =============================================================================
// Seller Forms
// =============================================================================

/// Body for product create / update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Price per day.
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<String>,
}

fn default_available() -> bool {
    true
}

impl ProductForm {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_product_name(&self.name)?;
        validate_price(self.price)
    }
}

/// Body for shop create / update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category_ids: Vec<String>,
}

impl ShopForm {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("name", &self.name)?;
        match self.phone_number.as_deref() {
            Some(phone) if !phone.trim().is_empty() => validate_phone(phone),
            _ => Ok(()),
        }
    }
}

/// Body for `POST /reviews/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewForm {
    pub product: String,
    /// 1 to 5 stars.
    pub rating: i64,
    #[serde(default)]
    pub comment: String,
}

impl ReviewForm {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("product", &self.product)?;
        if !(1..=5).contains(&self.rating) {
            return Err(ValidationError::OutOfRange {
                field: "rating".to_string(),
                min: 1,
                max: 5,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
