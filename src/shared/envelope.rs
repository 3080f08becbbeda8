/**
 * Response Envelope
 *
 * Every HTTP response, success or failure, is wrapped in the same JSON
 * envelope so clients only need one decoder:
 *
 * ```json
 * {
 *   "status": true,
 *   "code": 200,
 *   "message": "OK",
 *   "data": { ... },
 *   "version": "Secure Chat v1.0"
 * }
 * ```
 *
 * Failures set `status` to `false` and carry the semantic code
 * (400, 401, 403, 404, 500) in `code`.
 */
use serde::{Deserialize, Serialize};

/// API version reported in every envelope
pub const API_VERSION: &str = "Secure Chat v1.0";

/// Uniform response wrapper
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    /// `true` on success, `false` on any error
    pub status: bool,
    /// Semantic result code
    pub code: u16,
    /// Human-readable message
    pub message: String,
    /// Payload, `null` for errors and empty results
    pub data: Option<T>,
    /// API version string
    pub version: String,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`
    pub fn ok(data: T) -> Self {
        Self::ok_with_message(data, "OK")
    }

    /// Successful response with a custom message
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            status: true,
            code: 200,
            message: message.into(),
            data: Some(data),
            version: API_VERSION.to_string(),
        }
    }

    /// Error response without payload
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self {
            status: false,
            code,
            message: message.into(),
            data: None,
            version: API_VERSION.to_string(),
        }
    }
}

impl ApiResponse<()> {
    /// Successful response with only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: true,
            code: 200,
            message: message.into(),
            data: None,
            version: API_VERSION.to_string(),
        }
    }
}
