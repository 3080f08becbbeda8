//! Backend Error Module
//!
//! Error types of the chat backend and their conversion into the response
//! envelope.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - BackendError and its status mapping
//! └── conversion.rs - IntoResponse for BackendError and ApiResponse
//! ```
//!
//! # HTTP Response Conversion
//!
//! Handlers return `Result<ApiResponse<T>, BackendError>`. Both sides render
//! as the `{status, code, message, data, version}` envelope with HTTP 200.
//!
//! # Example
//!
//! ```rust,no_run
//! use securechat::backend::error::BackendError;
//! use securechat::shared::ApiResponse;
//!
//! async fn handler() -> Result<ApiResponse<String>, BackendError> {
//!     Err(BackendError::not_found("Group not found"))
//! }
//! ```

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::BackendError;

/// Result alias used throughout the backend
pub type BackendResult<T> = Result<T, BackendError>;
