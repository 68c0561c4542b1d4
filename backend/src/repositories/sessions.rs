//! Login session storage

use super::{RepoResult, RepositoryError, SessionRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use peso_shared::{Session, SessionId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRecord {
    pub id: Uuid,
    pub user_id: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn into_domain(self) -> RepoResult<Session> {
        Ok(Session::reconstruct(
            SessionId::from(self.id),
            UserId::new(&self.user_id)?,
            self.token,
            self.expires_at,
            self.created_at,
        ))
    }
}

/// Session repository backed by PostgreSQL
#[derive(Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn save(&self, session: &Session) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, token, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                token = EXCLUDED.token,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.user_id().as_str())
        .bind(session.token())
        .bind(session.expires_at())
        .bind(session.created_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> RepoResult<Session> {
        sqlx::query_as::<_, SessionRecord>(
            r#"
            SELECT id, user_id, token, expires_at, created_at
            FROM sessions
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("session".to_string()))?
        .into_domain()
    }

    async fn delete_by_token(&self, token: &str) -> RepoResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_by_user_id(&self, user_id: &UserId) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_expired(&self) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
