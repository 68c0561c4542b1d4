//! User repository for database operations

use super::{RepoResult, RepositoryError, UserRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use peso_shared::{Credential, User, UserId};
use sqlx::PgPool;

/// User record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn into_domain(self) -> RepoResult<User> {
        Ok(User::reconstruct(
            UserId::new(&self.id)?,
            self.name,
            self.email,
            self.password_hash.and_then(Credential::from_hash),
            self.active,
            self.created_at,
            self.updated_at,
        ))
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, name, email, password_hash, active, created_at, updated_at FROM users";

/// User repository backed by PostgreSQL
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn save(&self, user: &User) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                password_hash = EXCLUDED.password_hash,
                active = EXCLUDED.active,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user.id().as_str())
        .bind(user.name())
        .bind(user.email())
        .bind(user.credential().map(Credential::hash))
        .bind(user.is_active())
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> RepoResult<User> {
        sqlx::query_as::<_, UserRecord>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("user {}", id)))?
            .into_domain()
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<User> {
        // Deactivated accounts may share an address with a live one
        sqlx::query_as::<_, UserRecord>(&format!(
            "{SELECT_COLUMNS} WHERE email = $1 ORDER BY active DESC, created_at DESC LIMIT 1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("user with email {}", email)))?
        .into_domain()
    }

    async fn find_by_name(&self, name: &str) -> RepoResult<User> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "{SELECT_COLUMNS} WHERE name = $1 ORDER BY created_at ASC LIMIT 1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("user named {}", name)))?
        .into_domain()
    }

    async fn find_active(&self) -> RepoResult<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(&format!(
            "{SELECT_COLUMNS} WHERE active = TRUE ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        records.into_iter().map(UserRecord::into_domain).collect()
    }

    async fn exists(&self, id: &UserId) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND active = TRUE)",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
