//! Unified API response envelope.
//!
//! All responses carry `{ code, message, data }`; `E0000` is success and
//! the other codes mirror the HTTP status the envelope ships with.

use serde::Serialize;

/// Success code.
pub const CODE_SUCCESS: &str = "E0000";
/// Validation failure (400).
pub const CODE_VALIDATION: &str = "E0002";
/// Resource not found (404).
pub const CODE_NOT_FOUND: &str = "E0003";
/// Conflicting resource state (409).
pub const CODE_CONFLICT: &str = "E0004";
/// Permission denied (403).
pub const CODE_FORBIDDEN: &str = "E2001";
/// Storage backend failure (503).
pub const CODE_STORAGE: &str = "E9002";

/// Response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Response code (`E0000` = success).
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Payload, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Successful response with payload.
    pub fn ok(data: T) -> Self {
        Self {
            code: CODE_SUCCESS.to_string(),
            message: "Success".to_string(),
            data: Some(data),
        }
    }

    /// Error response without payload.
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            data: None,
        }
    }
}
