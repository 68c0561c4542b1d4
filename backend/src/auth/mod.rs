//! Authentication module
//!
//! Opaque session tokens backed by the session repository, with argon2
//! password hashing.

mod middleware;
mod password;

pub use middleware::{bearer_or_cookie_token, AuthUser, SESSION_COOKIE};
pub use password::PasswordService;
