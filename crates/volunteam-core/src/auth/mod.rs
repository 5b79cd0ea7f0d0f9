//! Authentication module for managing user sessions.
//!
//! This module provides:
//! - `Authenticator`: sign-in with auto-registration, restore and logout
//! - `Session`, `SessionStore`: the signed-in user, shared by reference
//! - email and password checks run before any network call
//!
//! Sessions are mirrored to the cache under `userInfo` and `accessToken`
//! and trusted until logout; there is no expiry.

pub mod flow;
pub mod session;
pub mod validate;

use thiserror::Error;

use crate::api::ApiError;
use crate::cache::CacheError;

pub use flow::Authenticator;
pub use session::{Session, SessionStore, PLACEHOLDER_TOKEN};
pub use validate::{sanitize_email, validate_email, validate_password};

/// Which login field failed its local check.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid email")]
    Email,

    #[error("invalid password")]
    Password,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User already exists: {0}")]
    UserExists(String),

    #[error("Registration failed: {0}")]
    RegistrationFailed(#[source] ApiError),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Session storage unavailable: {0}")]
    StorageUnavailable(#[source] CacheError),
}

impl AuthError {
    /// Message for the alert shown to the user. Internal detail stays in the logs.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Validation(field) => field.to_string(),
            AuthError::InvalidCredentials => "Incorrect password. Please try again.".to_string(),
            AuthError::UserExists(_) | AuthError::RegistrationFailed(_) => {
                "Sign-up failed. Please try again.".to_string()
            }
            AuthError::AuthenticationFailed(_) | AuthError::StorageUnavailable(_) => {
                "Something went wrong. Please try again later.".to_string()
            }
        }
    }
}
