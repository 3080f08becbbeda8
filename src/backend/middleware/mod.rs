//! Middleware Module
//!
//! Request-level concerns applied before handlers run.
//!
//! - **`auth`** - `AuthUser` extractor resolving bearer tokens
//!
//! # Example
//!
//! ```rust,no_run
//! use securechat::backend::middleware::AuthUser;
//! use securechat::shared::ApiResponse;
//!
//! async fn whoami(AuthUser(user): AuthUser) -> ApiResponse<String> {
//!     ApiResponse::ok(user.username)
//! }
//! ```

pub mod auth;

pub use auth::{bearer_token, AuthUser, AuthenticatedUser};
