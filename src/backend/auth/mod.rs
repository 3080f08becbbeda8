//! Authentication Module
//!
//! This module handles user registration, authentication and token
//! management.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── users.rs        - User model and database operations
//! ├── sessions.rs     - JWT creation and verification
//! ├── tokens.rs       - Token store (revocation by jti)
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - Access tokens live 30 days, refresh tokens 90 days by default
//! - Every token is recorded; unknown or revoked tokens are rejected
//! - Invalid credentials return the same message for unknown users and
//!   wrong passwords

/// User data model and database operations
pub mod users;

/// JWT token generation and validation
pub mod sessions;

/// Persisted token store
pub mod tokens;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::types::{AuthResponse, LoginRequest, SignupRequest, UserResponse};
pub use sessions::{Claims, TokenType};
pub use tokens::authenticate_token;
