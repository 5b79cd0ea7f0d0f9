//! Sign-in, auto-registration, restore and logout.
//!
//! A sign-in attempt runs validation, then looks the email up on the backend.
//! Known users are checked against their bcrypt hash; unknown emails are
//! registered on the spot. Either way the session is written to the cache
//! and published to the `SessionStore`. Nothing is published unless every
//! step succeeded.

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::api::Backend;
use crate::cache::{CacheManager, KEY_ACCESS_TOKEN, KEY_USER_INFO};
use crate::models::{PersonName, User};

use super::session::{Session, SessionStore, PLACEHOLDER_TOKEN};
use super::validate::{sanitize_email, validate_email, validate_password};
use super::{AuthError, ValidationError};

/// bcrypt work factor for new accounts
pub const HASH_COST: u32 = 10;

/// Mobile number given to accounts created from the login screen
const PLACEHOLDER_MOBILE: &str = "584-000-999";

pub struct Authenticator<'a, B> {
    backend: &'a B,
    cache: &'a CacheManager,
    sessions: &'a SessionStore,
}

impl<'a, B: Backend> Authenticator<'a, B> {
    pub fn new(backend: &'a B, cache: &'a CacheManager, sessions: &'a SessionStore) -> Self {
        Self {
            backend,
            cache,
            sessions,
        }
    }

    /// Sign in with `email` and `password`, registering the email if no
    /// account exists yet.
    pub async fn handle_authentication(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        if !validate_email(email) {
            return Err(ValidationError::Email.into());
        }
        if !validate_password(password) {
            return Err(ValidationError::Password.into());
        }

        let email = sanitize_email(email);
        debug!(email = %email, "Looking up account");

        let users = self.backend.list_users().await.map_err(|e| {
            error!(error = %e, "User lookup failed");
            AuthError::AuthenticationFailed(e.to_string())
        })?;

        let user = match users.into_iter().find(|u| u.email == email) {
            Some(user) => {
                if !verify_password(password, &user.password_hash).await? {
                    warn!(email = %email, "Password mismatch");
                    return Err(AuthError::InvalidCredentials);
                }
                user
            }
            None => {
                info!(email = %email, "No account found, registering");
                self.register(&email, password).await?
            }
        };

        let session = self.commit(user, PLACEHOLDER_TOKEN)?;
        info!(user_id = %session.user.id, "Signed in");
        Ok(session)
    }

    async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        // Re-check before creating; a concurrent registration can still slip
        // in between this read and the POST.
        let users = self.backend.list_users().await.map_err(|e| {
            error!(error = %e, "User re-check failed");
            AuthError::RegistrationFailed(e)
        })?;
        if users.iter().any(|u| u.email == email) {
            return Err(AuthError::UserExists(email.to_string()));
        }

        let password_hash = hash_password(password).await?;
        let new_user = User {
            id: Utc::now().timestamp_millis().to_string(),
            email: email.to_string(),
            password_hash,
            name: PersonName::default(),
            mobile: PLACEHOLDER_MOBILE.to_string(),
        };

        self.backend.create_user(&new_user).await.map_err(|e| {
            error!(error = %e, "User registration failed");
            AuthError::RegistrationFailed(e)
        })?;

        Ok(new_user)
    }

    /// Persist the session, then publish it. A failed write rolls back both keys.
    fn commit(&self, user: User, token: &str) -> Result<Session, AuthError> {
        let written = self
            .cache
            .set(KEY_USER_INFO, &user)
            .and_then(|()| self.cache.set(KEY_ACCESS_TOKEN, token));

        if let Err(e) = written {
            error!(error = %e, "Failed to persist session");
            if let Err(cleanup) = self.cache.remove(&[KEY_USER_INFO, KEY_ACCESS_TOKEN]) {
                warn!(error = %cleanup, "Failed to roll back partial session");
            }
            return Err(AuthError::StorageUnavailable(e));
        }

        let session = Session::new(user, token);
        self.sessions.set(session.clone());
        Ok(session)
    }

    /// Publish the cached session, if any. The cached user is trusted as-is.
    pub fn restore(&self) -> Option<Session> {
        let user: User = match self.cache.get(KEY_USER_INFO) {
            Ok(Some(user)) => user,
            Ok(None) => {
                debug!("No cached session");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read cached session");
                return None;
            }
        };

        let token = match self.cache.get::<String>(KEY_ACCESS_TOKEN) {
            Ok(Some(token)) => token,
            Ok(None) => PLACEHOLDER_TOKEN.to_string(),
            Err(e) => {
                warn!(error = %e, "Failed to read cached token");
                PLACEHOLDER_TOKEN.to_string()
            }
        };

        let session = Session::new(user, token);
        self.sessions.set(session.clone());
        info!(user_id = %session.user.id, "Session restored from cache");
        Some(session)
    }

    /// Forget the session. Never fails.
    pub fn logout(&self) {
        if let Err(e) = self.cache.remove(&[KEY_USER_INFO, KEY_ACCESS_TOKEN]) {
            warn!(error = %e, "Failed to remove cached session");
        }
        self.sessions.clear();
        info!("Signed out");
    }
}

async fn hash_password(password: &str) -> Result<String, AuthError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, HASH_COST))
        .await
        .map_err(|e| AuthError::AuthenticationFailed(e.to_string()))?
        .map_err(|e| AuthError::AuthenticationFailed(e.to_string()))
}

async fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::AuthenticationFailed(e.to_string()))?
        .map_err(|e| {
            // Malformed stored hash
            warn!(error = %e, "Stored password hash could not be checked");
            AuthError::AuthenticationFailed(e.to_string())
        })
}
