//! Authentication routes
//!
//! Registration, login, the set-password flow and logout. Each successful
//! login hands back the session token in the body and as a cookie.

use crate::auth::{AuthUser, SESSION_COOKIE};
use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use peso_shared::{Session, User, SESSION_LIFETIME_DAYS};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/set-password", post(set_password))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(max = 254, message = "Email is too long"))]
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[validate(length(max = 254, message = "Email is too long"))]
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub has_password: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            name: user.name().to_string(),
            email: user.email().to_string(),
            has_password: user.has_password(),
            created_at: user.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserResponse,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    )
}

fn session_response(user: &User, session: &Session) -> impl IntoResponse {
    let cookie = session_cookie(session.token(), SESSION_LIFETIME_DAYS * 24 * 60 * 60);
    (
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(SessionResponse {
            user: UserResponse::from(user),
            token: session.token().to_string(),
            expires_at: session.expires_at(),
        }),
    )
}

/// POST /api/v1/auth/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;
    let (user, session) = state
        .auth
        .register(&req.name, &req.email, req.password.expose_secret())
        .await?;
    Ok(session_response(&user, &session))
}

/// POST /api/v1/auth/login
///
/// Accounts without a password answer 409 `NO_PASSWORD`.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;
    let (user, session) = state
        .auth
        .login(&req.email, req.password.expose_secret())
        .await?;
    Ok(session_response(&user, &session))
}

/// POST /api/v1/auth/set-password
async fn set_password(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;
    let (user, session) = state
        .auth
        .set_password(&req.email, req.password.expose_secret())
        .await?;
    Ok(session_response(&user, &session))
}

/// POST /api/v1/auth/logout
async fn logout(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    state.auth.logout(&auth.token).await?;
    Ok((
        AppendHeaders([(SET_COOKIE, session_cookie("", 0))]),
        Json(serde_json::json!({ "logged_out": true })),
    ))
}

/// GET /api/v1/auth/me
async fn me(auth: AuthUser) -> Json<UserResponse> {
    Json(UserResponse::from(&auth.user))
}
