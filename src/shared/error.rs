//! Shared Error Types
//!
//! Errors raised while validating wire-level request bodies, before anything
//! reaches the backend core.
//!
//! # Error Categories
//!
//! - `ValidationError` - A field is missing, too short, too long, or malformed
//! - `SerializationError` - JSON encoding/decoding failures
//!
//! # Usage
//!
//! ```rust
//! use securechat::shared::error::SharedError;
//!
//! let error = SharedError::validation("username", "Username is required");
//! ```
use thiserror::Error;

/// Validation errors shared by request DTOs
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("{field}: {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}

/// Check that a string field's character count lies within `min..=max`.
///
/// Leading and trailing whitespace is not counted, so `"   "` is empty.
pub fn require_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), SharedError> {
    let len = value.trim().chars().count();
    if len < min {
        if min == 1 {
            return Err(SharedError::validation(field, "is required"));
        }
        return Err(SharedError::validation(
            field,
            format!("must be at least {} characters", min),
        ));
    }
    if len > max {
        return Err(SharedError::validation(
            field,
            format!("must be at most {} characters", max),
        ));
    }
    Ok(())
}

/// Check that a username is 3-50 chars, starts with a letter, and only
/// contains letters, digits and underscores.
pub fn require_username(value: &str) -> Result<(), SharedError> {
    require_length("username", value, 3, 50)?;
    let mut chars = value.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_with_letter || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(SharedError::validation(
            "username",
            "must start with a letter and contain only letters, numbers, and underscores",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_validation_error() {
        let error = SharedError::validation("username", "is required");
        match error {
            SharedError::ValidationError { field, message } => {
                assert_eq!(field, "username");
                assert_eq!(message, "is required");
            }
            _ => panic!("Expected ValidationError"),
        }
    }

    #[test]
    fn test_error_display() {
        let error = SharedError::validation("password", "must be at least 6 characters");
        assert_eq!(error.to_string(), "password: must be at least 6 characters");
    }

    #[test]
    fn test_from_serde_error() {
        let result: Result<serde_json::Value, _> = serde_json::from_str("{ invalid json }");
        let shared_error: SharedError = result.unwrap_err().into();
        assert_matches!(shared_error, SharedError::SerializationError { .. });
    }

    #[test]
    fn test_require_length_bounds() {
        assert!(require_length("name", "abc", 1, 3).is_ok());
        assert_matches!(
            require_length("name", "   ", 1, 3),
            Err(SharedError::ValidationError { message, .. }) if message == "is required"
        );
        assert!(require_length("name", "abcd", 1, 3).is_err());
        assert!(require_length("password", "12345", 6, 50).is_err());
    }

    #[test]
    fn test_require_username() {
        assert!(require_username("alice_01").is_ok());
        assert!(require_username("1alice").is_err());
        assert!(require_username("al").is_err());
        assert!(require_username("ali ce").is_err());
    }
}
