//! Account and session lifecycle
//!
//! Registration, password login, the set-password flow for accounts created
//! without one, and bearer session validation.

use super::AuthError;
use crate::auth::PasswordService;
use crate::repositories::{SessionRepository, UserRepository};
use peso_shared::validation::{is_valid_email, normalize_email};
use peso_shared::{Credential, Session, User, UserId};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { users, sessions }
    }

    async fn hash_password(password: &str) -> Result<Credential, AuthError> {
        Credential::check_plaintext(password)?;
        PasswordService::hash_async(password.to_string())
            .await
            .map_err(|e| AuthError::PasswordHashing(e.to_string()))
    }

    async fn open_session(&self, user: &User) -> Result<Session, AuthError> {
        let session = Session::new(user.id().clone());
        self.sessions
            .save(&session)
            .await
            .map_err(AuthError::repository("save session"))?;
        Ok(session)
    }

    /// Create an account with a password and log it in
    #[instrument(skip(self, name, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, Session), AuthError> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(AuthError::InvalidEmail);
        }

        let mut user = User::new(UserId::generate(), name, email)?;

        let taken = self
            .users
            .email_exists(user.email())
            .await
            .map_err(AuthError::repository("check email"))?;
        if taken {
            return Err(AuthError::EmailAlreadyExists);
        }

        user.set_credential(Self::hash_password(password).await?);

        self.users
            .save(&user)
            .await
            .map_err(AuthError::repository("save user"))?;
        let session = self.open_session(&user).await?;

        info!(user_id = %user.id(), "User registered");
        Ok((user, session))
    }

    /// Log in with email and password.
    ///
    /// An unknown email and a wrong password fail the same way. An account
    /// without a password fails with [`AuthError::NoPassword`] carrying the user.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, Session), AuthError> {
        let email = normalize_email(email);

        let user = self.users.find_by_email(&email).await.map_err(|err| {
            if err.is_not_found() {
                AuthError::InvalidCredentials
            } else {
                AuthError::repository("find user")(err)
            }
        })?;

        let Some(credential) = user.credential().cloned() else {
            return Err(AuthError::NoPassword(Box::new(user)));
        };

        let verified = PasswordService::verify_async(password.to_string(), credential)
            .await
            .map_err(|e| AuthError::PasswordHashing(e.to_string()))?;
        if !verified {
            warn!(user_id = %user.id(), "Failed login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        let session = self.open_session(&user).await?;
        info!(user_id = %user.id(), "User logged in");
        Ok((user, session))
    }

    /// Set the password of an existing account and log it in
    #[instrument(skip(self, password))]
    pub async fn set_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(User, Session), AuthError> {
        let email = normalize_email(email);

        let mut user = self.users.find_by_email(&email).await.map_err(|err| {
            if err.is_not_found() {
                AuthError::UserNotFound
            } else {
                AuthError::repository("find user")(err)
            }
        })?;

        let credential = Self::hash_password(password).await?;
        user.set_credential(credential);

        self.users
            .save(&user)
            .await
            .map_err(AuthError::repository("save user"))?;
        let session = self.open_session(&user).await?;

        info!(user_id = %user.id(), "Password set");
        Ok((user, session))
    }

    /// End a session. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.sessions
            .delete_by_token(token)
            .await
            .map_err(AuthError::repository("delete session"))
    }

    /// Resolve the user behind a session token.
    ///
    /// Unknown and expired tokens both yield [`AuthError::SessionExpired`];
    /// an expired session is deleted on the way out.
    pub async fn validate_session(&self, token: &str) -> Result<User, AuthError> {
        let session = self.sessions.find_by_token(token).await.map_err(|err| {
            if err.is_not_found() {
                AuthError::SessionExpired
            } else {
                AuthError::repository("find session")(err)
            }
        })?;

        if session.is_expired() {
            if let Err(err) = self.sessions.delete_by_token(token).await {
                warn!(error = %err, "Failed to delete expired session");
            }
            return Err(AuthError::SessionExpired);
        }

        self.users
            .find_by_id(session.user_id())
            .await
            .map_err(|err| {
                if err.is_not_found() {
                    warn!(user_id = %session.user_id(), "Live session for missing user");
                    AuthError::UserNotFound
                } else {
                    AuthError::repository("find session user")(err)
                }
            })
    }

    /// Delete every expired session, returning how many were removed
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, AuthError> {
        let removed = self
            .sessions
            .delete_expired()
            .await
            .map_err(AuthError::repository("delete expired sessions"))?;
        info!(removed, "Expired sessions cleaned up");
        Ok(removed)
    }
}
