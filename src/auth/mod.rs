//! Credentials: signed session tokens and password hashing.

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password, PasswordError};
pub use token::{extract_bearer, Claims, TokenError, TokenService, TOKEN_TTL_SECS};
