//! Authentication Handlers Module
//!
//! HTTP handlers for the auth and user directory endpoints.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Request and response types
//! ├── signup.rs     - POST /users
//! ├── login.rs      - POST /auth/login
//! ├── refresh.rs    - POST /auth/refresh
//! ├── logout.rs     - DELETE /auth/logout
//! ├── me.rs         - GET /users/profile
//! ├── account.rs    - PUT /users/profile, /users/change_password, /users/{id}, /users/{id}/reset_password
//! └── directory.rs  - GET /users/{id}, /users/friends, /users/{id}/online, DELETE /users/{id}
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Signup**: username, password, display name, public key → user created
//! 2. **Login**: credentials verified → access and refresh tokens returned
//! 3. **Refresh**: refresh token → new access token
//! 4. **Logout**: current access token revoked, its socket sessions closed
//! 5. **Change password**: every other token revoked

/// Request and response types
pub mod types;

/// Signup handler
pub mod signup;

/// Login handler
pub mod login;

/// Refresh handler
pub mod refresh;

/// Logout handler
pub mod logout;

/// Get current user handler
pub mod me;

/// User directory handlers
pub mod directory;

/// Profile and password handlers
pub mod account;

pub use types::{
    AdminUpdateUserRequest, AuthResponse, ChangePasswordRequest, LoginRequest, OnlineResponse,
    ProfileResponse, RefreshResponse, ResetPasswordRequest, SignupRequest, UpdateProfileRequest,
    UserResponse,
};

pub use account::{admin_update_user, change_password, reset_password, update_profile};
pub use directory::{deactivate_user, get_friends, get_online, get_user};
pub use login::login;
pub use logout::logout;
pub use me::get_me;
pub use refresh::refresh;
pub use signup::signup;
