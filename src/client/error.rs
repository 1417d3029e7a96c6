//! Normalized transport error.
//!
//! Every failed call to the Recipe Vault backend, whether it never got a response or
//! got an error status, is turned into a single [`ApiError`] shape so that callers can
//! surface `message` directly or branch on `status`.

use std::collections::HashMap;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

pub const CODE_NETWORK: &str = "ERR_NETWORK";
pub const CODE_TIMEOUT: &str = "ECONNABORTED";
pub const CODE_BAD_REQUEST: &str = "ERR_BAD_REQUEST";
pub const CODE_BAD_RESPONSE: &str = "ERR_BAD_RESPONSE";

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    /// Human-readable message, safe to show to the user
    pub message: String,
    /// HTTP status, absent when no response was received
    pub status: Option<u16>,
    /// Classification code (`ERR_NETWORK`, `ECONNABORTED`, `ERR_BAD_REQUEST`, `ERR_BAD_RESPONSE`)
    pub code: Option<String>,
    /// Raw response payload
    pub data: Option<Value>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            code: None,
            data: None,
        }
    }

    /// No response was received.
    pub fn network(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self {
                message: "Request timed out - please try again".to_string(),
                status: None,
                code: Some(CODE_TIMEOUT.to_string()),
                data: None,
            }
        } else if err.is_builder() {
            Self::new(format!("Invalid request: {}", err))
        } else {
            Self {
                message: "Network error - please check your connection".to_string(),
                status: None,
                code: Some(CODE_NETWORK.to_string()),
                data: None,
            }
        }
    }

    /// The server answered with a non-success status. `body` is the raw response text.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let data = if body.trim().is_empty() {
            None
        } else {
            Some(
                serde_json::from_str::<Value>(body)
                    .unwrap_or_else(|_| Value::String(body.to_string())),
            )
        };

        let message = data
            .as_ref()
            .and_then(|d| d.get("message"))
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_message(status));

        let code = if status.is_server_error() {
            CODE_BAD_RESPONSE
        } else {
            CODE_BAD_REQUEST
        };

        Self {
            message,
            status: Some(status.as_u16()),
            code: Some(code.to_string()),
            data,
        }
    }

    /// The server answered successfully but the body was not what we expected.
    pub fn invalid_body(status: StatusCode, err: impl std::fmt::Display) -> Self {
        Self {
            message: format!("Invalid response from server: {}", err),
            status: Some(status.as_u16()),
            code: Some(CODE_BAD_RESPONSE.to_string()),
            data: None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(StatusCode::NOT_FOUND.as_u16())
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(StatusCode::UNAUTHORIZED.as_u16())
    }

    /// Per-field validation messages from the backend's `errors` map.
    pub fn field_errors(&self) -> HashMap<String, String> {
        self.data
            .as_ref()
            .and_then(|d| d.get("errors"))
            .and_then(Value::as_object)
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|(field, msg)| msg.as_str().map(|m| (field.clone(), m.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn default_message(status: StatusCode) -> String {
    match status.as_u16() {
        400 => "Bad request - please check your input".to_string(),
        401 => "Unauthorized - please login".to_string(),
        403 => "Forbidden - insufficient permissions".to_string(),
        404 => "Resource not found".to_string(),
        422 => "Validation error - please check your input".to_string(),
        500 => "Server error - please try again later".to_string(),
        other => format!("Request failed with status {}", other),
    }
}
