//! # Application Error Type
//!
//! One error type for everything a view or the CLI can receive.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ValidationError (form rejected, nothing sent) ──┐                      │
//! │  CoreError (cart limits, status rules) ──────────┤                      │
//! │  StoreError (local SQLite) ──────────────────────┼──► AppError          │
//! │  ClientError (network, HTTP status) ─────────────┤    { code, message,  │
//! │  ConfigError (melar.toml, MELAR_*) ──────────────┘      fields }        │
//! │                                                                         │
//! │  The view shows `message` and, for forms, `fields` next to each input.  │
//! │  Nothing here is fatal: every path returns to an interactive state.     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::fmt;

use melar_client::ClientError;
use melar_core::{CoreError, ValidationError};
use melar_store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Error surfaced to a view.
///
/// ## Serialization
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "email: Enter a valid email address.",
///   "fields": { "email": ["Enter a valid email address."] }
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    /// Per-field messages for form errors.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    /// No session, or the backend rejected the token.
    NotAuthenticated,
    /// The backend could not be reached.
    NetworkError,
    /// The backend answered with a server error or an unreadable body.
    BackendError,
    /// The backend refused the request (4xx other than auth and not found).
    Rejected,
    StorageError,
    CartError,
    /// The order state machine does not allow the requested change.
    InvalidTransition,
    /// The same action is already in flight.
    Busy,
    ConfigError,
    Internal,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        AppError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    pub fn not_authenticated() -> Self {
        AppError::new(ErrorCode::NotAuthenticated, "Please log in to continue")
    }

    pub fn busy(action: &str) -> Self {
        AppError::new(ErrorCode::Busy, format!("{} is already in progress", action))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }

    /// Collects several form errors into one, keyed by field.
    pub fn from_field_errors(errors: Vec<ValidationError>) -> Self {
        let message = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for err in errors {
            fields
                .entry(err.field().to_string())
                .or_default()
                .push(err.to_string());
        }
        AppError {
            code: ErrorCode::ValidationError,
            message,
            fields,
        }
    }

    pub fn is_not_authenticated(&self) -> bool {
        self.code == ErrorCode::NotAuthenticated
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

// =============================================================================
// Conversions
// =============================================================================

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::from_field_errors(vec![err])
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            CoreError::CartLineNotFound(id) => AppError::not_found("Cart item", &id),
            e @ (CoreError::CartTooLarge { .. } | CoreError::EmptyCart) => {
                AppError::new(ErrorCode::CartError, e.to_string())
            }
            e @ CoreError::QuantityTooLarge { .. } => AppError::validation(e.to_string()),
            e @ CoreError::AmountTooLarge { .. } => AppError::new(ErrorCode::CartError, e.to_string()),
            e @ (CoreError::InvalidStatusTransition { .. } | CoreError::CancelNotAllowed { .. }) => {
                AppError::new(ErrorCode::InvalidTransition, e.to_string())
            }
            e @ CoreError::UnknownStatus(_) => AppError::new(ErrorCode::BackendError, e.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => AppError::not_found(&entity, &id),
            other => {
                // Keep SQL details in the log, not in the message.
                tracing::error!(error = %other, "Local storage failed");
                AppError::new(ErrorCode::StorageError, "Local storage is unavailable")
            }
        }
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Transport(e) => {
                tracing::warn!(error = %e, "Backend unreachable");
                AppError::new(
                    ErrorCode::NetworkError,
                    "Could not reach the server. Check your connection and try again.",
                )
            }
            ClientError::NotAuthenticated => AppError::not_authenticated(),
            ClientError::Http { status, detail, fields } => {
                let code = match status {
                    401 | 403 => ErrorCode::NotAuthenticated,
                    404 => ErrorCode::NotFound,
                    400 if !fields.is_empty() => ErrorCode::ValidationError,
                    s if s >= 500 => ErrorCode::BackendError,
                    _ => ErrorCode::Rejected,
                };
                AppError {
                    code,
                    message: detail,
                    fields,
                }
            }
            ClientError::Decode { path, reason } => {
                tracing::error!(path = %path, reason = %reason, "Unreadable backend response");
                AppError::new(ErrorCode::BackendError, "The server sent an unexpected response")
            }
            ClientError::InvalidUrl(e) => {
                AppError::new(ErrorCode::ConfigError, format!("Invalid API URL: {}", e))
            }
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(ErrorCode::ConfigError, err.to_string())
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is present but unusable.
    ///
    /// ## When This Occurs
    /// - `api.base_url` is not an http(s) URL
    /// - A fee rate above 100%
    /// - An admin WhatsApp number with no digits
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
