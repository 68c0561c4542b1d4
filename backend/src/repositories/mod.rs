//! Repository capabilities
//!
//! Services depend on these traits only. Two implementations exist: the
//! PostgreSQL repositories used by the server and the in-memory ones used in
//! tests.
//!
//! Contract shared by every implementation:
//! - a missing record is reported as [`RepositoryError::NotFound`], never as
//!   an empty success;
//! - `save` upserts by id and concurrent writers converge last-write-wins;
//! - [`WeightRepository::find_by_user_id_and_period`] returns measurements in
//!   ascending `measured_at` order, [`WeightRepository::find_by_user_id`] in
//!   descending order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use peso_shared::{DomainError, Goal, GoalId, Session, User, UserId, Weight, WeightId};
use thiserror::Error;

pub mod goals;
pub mod memory;
pub mod sessions;
pub mod user;
pub mod weight;

pub use goals::PgGoalRepository;
pub use memory::{
    InMemoryGoalRepository, InMemorySessionRepository, InMemoryUserRepository,
    InMemoryWeightRepository,
};
pub use sessions::PgSessionRepository;
pub use user::PgUserRepository;
pub use weight::PgWeightRepository;

/// Failure reported by a repository
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(String),

    /// A stored row no longer satisfies the domain rules
    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RepositoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound(_))
    }
}

impl From<DomainError> for RepositoryError {
    fn from(err: DomainError) -> Self {
        RepositoryError::Corrupt(err.to_string())
    }
}

pub type RepoResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn save(&self, user: &User) -> RepoResult<()>;
    async fn find_by_id(&self, id: &UserId) -> RepoResult<User>;
    async fn find_by_email(&self, email: &str) -> RepoResult<User>;
    async fn find_by_name(&self, name: &str) -> RepoResult<User>;
    /// Active users ordered by name
    async fn find_active(&self) -> RepoResult<Vec<User>>;
    async fn exists(&self, id: &UserId) -> RepoResult<bool>;
    /// Whether an active user already uses `email`
    async fn email_exists(&self, email: &str) -> RepoResult<bool>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn save(&self, session: &Session) -> RepoResult<()>;
    async fn find_by_token(&self, token: &str) -> RepoResult<Session>;
    /// Removing an unknown token is not an error
    async fn delete_by_token(&self, token: &str) -> RepoResult<()>;
    async fn delete_by_user_id(&self, user_id: &UserId) -> RepoResult<u64>;
    /// Remove every session whose expiry lies before now
    async fn delete_expired(&self) -> RepoResult<u64>;
}

#[async_trait]
pub trait WeightRepository: Send + Sync {
    async fn save(&self, weight: &Weight) -> RepoResult<()>;
    async fn find_by_id(&self, id: &WeightId) -> RepoResult<Weight>;
    /// Newest first, at most `limit` measurements
    async fn find_by_user_id(&self, user_id: &UserId, limit: usize) -> RepoResult<Vec<Weight>>;
    /// Oldest first, `from` and `to` inclusive
    async fn find_by_user_id_and_period(
        &self,
        user_id: &UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepoResult<Vec<Weight>>;
    async fn find_latest_by_user_id(&self, user_id: &UserId) -> RepoResult<Weight>;
    /// Measurements on the UTC calendar day containing `date`
    async fn count_by_user_id_and_date(
        &self,
        user_id: &UserId,
        date: DateTime<Utc>,
    ) -> RepoResult<usize>;
    async fn delete(&self, id: &WeightId) -> RepoResult<()>;
}

#[async_trait]
pub trait GoalRepository: Send + Sync {
    async fn save(&self, goal: &Goal) -> RepoResult<()>;
    async fn find_by_id(&self, id: &GoalId) -> RepoResult<Goal>;
    /// Most recently created active goal
    async fn find_active_by_user_id(&self, user_id: &UserId) -> RepoResult<Goal>;
    /// Newest first
    async fn find_by_user_id(&self, user_id: &UserId) -> RepoResult<Vec<Goal>>;
    async fn deactivate_by_user_id(&self, user_id: &UserId) -> RepoResult<u64>;
    async fn delete(&self, id: &GoalId) -> RepoResult<()>;
}
