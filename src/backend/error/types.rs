/**
 * Backend Error Types
 *
 * This module defines the error taxonomy of the chat backend. Every handler
 * and every core operation returns `BackendError`, which renders as the
 * uniform response envelope.
 *
 * # Error Categories
 *
 * ## Caller errors (surfaced as-is, never retried)
 *
 * - `ValidationError` - malformed or missing fields, detected before any mutation
 * - `NotFoundError` - unknown user, group, conversation or message
 * - `AuthError` - invalid, expired or revoked token
 * - `PermissionError` - caller is neither a member nor an admin
 *
 * ## Server errors (generic message, details only in logs)
 *
 * - `DatabaseError` - any sqlx failure; multi-row writes are rolled back
 * - `TokenError` - JWT encoding/decoding failure
 * - `PasswordError` - bcrypt failure
 * - `InternalError` - anything else
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::chat::key::KeyError;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use securechat::backend::error::BackendError;
///
/// let err = BackendError::not_found("User not found");
/// assert_eq!(err.code(), 404);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Malformed or missing request data
    #[error("Validation error: {message}")]
    ValidationError {
        /// Human-readable error message
        message: String,
    },

    /// Unknown entity
    #[error("Not found: {message}")]
    NotFoundError {
        /// Human-readable error message
        message: String,
    },

    /// Missing, invalid, expired or revoked credentials
    #[error("Auth error: {message}")]
    AuthError {
        /// Human-readable error message
        message: String,
    },

    /// Authenticated, but not allowed
    #[error("Permission error: {message}")]
    PermissionError {
        /// Human-readable error message
        message: String,
    },

    /// Field validation error from the shared DTO validators
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Persistence failure
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// JWT failure
    #[error("Token error: {0}")]
    TokenError(#[from] jsonwebtoken::errors::Error),

    /// Password hashing failure
    #[error("Password error: {0}")]
    PasswordError(#[from] bcrypt::BcryptError),

    /// Anything else that is the server's fault
    #[error("Internal error: {message}")]
    InternalError {
        /// Human-readable error message
        message: String,
    },
}

impl BackendError {
    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFoundError {
            message: message.into(),
        }
    }

    /// Create a new auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::AuthError {
            message: message.into(),
        }
    }

    /// Create a new permission error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::PermissionError {
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Get the semantic status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `ValidationError`, `SharedError` - 400 Bad Request
    /// - `AuthError`, `TokenError` - 401 Unauthorized
    /// - `PermissionError` - 403 Forbidden
    /// - `NotFoundError` - 404 Not Found
    /// - everything else - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError { .. } | Self::SharedError(_) => StatusCode::BAD_REQUEST,
            Self::AuthError { .. } | Self::TokenError(_) => StatusCode::UNAUTHORIZED,
            Self::PermissionError { .. } => StatusCode::FORBIDDEN,
            Self::NotFoundError { .. } => StatusCode::NOT_FOUND,
            Self::DatabaseError(_) | Self::PasswordError(_) | Self::InternalError { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Status code as a plain integer, as carried in the envelope
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }

    /// Get the message shown to the caller
    ///
    /// Server-side failures are reported generically; their details only
    /// go to the log.
    pub fn message(&self) -> String {
        match self {
            Self::ValidationError { message }
            | Self::NotFoundError { message }
            | Self::AuthError { message }
            | Self::PermissionError { message } => message.clone(),
            Self::SharedError(err) => err.to_string(),
            Self::DatabaseError(_) => "database error".to_string(),
            Self::TokenError(_) => "Invalid or expired token".to_string(),
            Self::PasswordError(_) | Self::InternalError { .. } => "internal error".to_string(),
        }
    }
}

/// Malformed ids are the caller's fault
impl From<KeyError> for BackendError {
    fn from(err: KeyError) -> Self {
        Self::validation(format!("Invalid conversation id: {err}"))
    }
}
