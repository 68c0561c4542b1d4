//! Login sessions

use crate::ids::{SessionId, UserId};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;

/// Random bytes behind every session token
const TOKEN_BYTES: usize = 32;

/// How long a session stays valid after login
pub const SESSION_LIFETIME_DAYS: i64 = 30;

/// A bearer session proving a previous login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    user_id: UserId,
    token: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl Session {
    /// Open a new session for `user_id` with a fresh random token
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::generate(),
            user_id,
            token: generate_token(),
            expires_at: now + Duration::days(SESSION_LIFETIME_DAYS),
            created_at: now,
        }
    }

    pub fn reconstruct(
        id: SessionId,
        user_id: UserId,
        token: String,
        expires_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            token,
            expires_at,
            created_at,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Checked against the clock on every call
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        !self.is_expired()
    }
}

/// URL-safe (hex) encoding of OS-random bytes
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
