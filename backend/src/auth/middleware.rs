//! Session authentication extractor
//!
//! Reads the session token from `Authorization: Bearer <token>` or, failing
//! that, from the `session_token` cookie, and resolves it through
//! [`AuthService::validate_session`](crate::services::AuthService::validate_session).

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
};
use peso_shared::{User, UserId};

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session_token";

/// Authenticated user behind a valid session
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

impl AuthUser {
    pub fn user_id(&self) -> &UserId {
        self.user.id()
    }
}

/// Session token from the request headers, bearer header first
pub fn bearer_or_cookie_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_string())
        .filter(|token| !token.is_empty())
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = bearer_or_cookie_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("Missing session token".to_string()))?;

        let user = app_state.auth.validate_session(&token).await?;

        Ok(AuthUser { user, token })
    }
}
