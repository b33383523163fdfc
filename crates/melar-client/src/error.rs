//! # Client Error Types
//!
//! ## Error Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  reqwest send() fails ───────────────► ClientError::Transport           │
//! │                                         (offline, DNS, timeout)         │
//! │                                                                         │
//! │  status not 2xx ─────────────────────► ClientError::Http                │
//! │     body {"detail": "..."}              detail = that message           │
//! │     body {"email": ["..."], ...}        fields = per-field messages     │
//! │                                                                         │
//! │  2xx but body is not the expected ───► ClientError::Decode              │
//! │  shape                                                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No variant is retried automatically.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never got an HTTP response.
    ///
    /// ## When This Occurs
    /// - Backend down or unreachable
    /// - Request timeout
    #[error("Network error: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {detail}")]
    Http {
        status: u16,
        detail: String,
        /// Field-level messages from a validation error body.
        fields: BTreeMap<String, Vec<String>>,
    },

    /// A 2xx response whose body could not be decoded.
    #[error("Unexpected response from {path}: {reason}")]
    Decode { path: String, reason: String },

    /// The configured base URL or a built path is not a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The operation needs a logged-in session.
    #[error("Not authenticated")]
    NotAuthenticated,
}

impl ClientError {
    /// HTTP status, if the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 401 or 403, or no token at all.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::NotAuthenticated)
            || matches!(self.status(), Some(401) | Some(403))
    }

    /// Worth falling back to local data: the backend could not be reached
    /// or failed on its side.
    pub fn is_unavailable(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn field_errors(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        match self {
            ClientError::Http { fields, .. } if !fields.is_empty() => Some(fields),
            _ => None,
        }
    }

    /// Builds an `Http` error from a response status and raw body.
    ///
    /// ## Body Shapes
    /// ```text
    /// {"detail": "Invalid token."}              → detail
    /// {"non_field_errors": ["Unable to log in"]} → detail
    /// {"email": ["Enter a valid email."]}        → fields, detail = "email: ..."
    /// ["End date cannot be before start date."]  → detail
    /// <html>...                                  → detail = status reason
    /// ```
    pub fn from_response(status: u16, reason: Option<&str>, body: &str) -> Self {
        let fallback = || {
            reason
                .map(str::to_string)
                .unwrap_or_else(|| format!("Request failed with status {}", status))
        };

        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let (detail, fields) = match parsed {
            Some(Value::Object(map)) => {
                let mut fields = BTreeMap::new();
                let mut detail = None;
                for (key, value) in map {
                    let messages = messages_of(&value);
                    match key.as_str() {
                        "detail" | "non_field_errors" | "error" => {
                            if detail.is_none() && !messages.is_empty() {
                                detail = Some(messages.join(" "));
                            }
                        }
                        _ => {
                            if !messages.is_empty() {
                                fields.insert(key, messages);
                            }
                        }
                    }
                }
                let detail = detail
                    .or_else(|| {
                        fields
                            .iter()
                            .next()
                            .map(|(field, msgs)| format!("{}: {}", field, msgs.join(" ")))
                    })
                    .unwrap_or_else(fallback);
                (detail, fields)
            }
            Some(value @ Value::Array(_)) | Some(value @ Value::String(_)) => {
                let messages = messages_of(&value);
                let detail = if messages.is_empty() {
                    fallback()
                } else {
                    messages.join(" ")
                };
                (detail, BTreeMap::new())
            }
            _ => (fallback(), BTreeMap::new()),
        };

        ClientError::Http {
            status,
            detail,
            fields,
        }
    }
}

fn messages_of(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items.iter().flat_map(messages_of).collect(),
        Value::Object(map) => map.values().flat_map(messages_of).collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
