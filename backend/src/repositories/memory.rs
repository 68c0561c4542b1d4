//! In-memory repositories
//!
//! Same contract as the PostgreSQL repositories, kept behind `RwLock`ed maps.
//! Used by the service tests and handy for running the API without a database.

use super::{
    GoalRepository, RepoResult, RepositoryError, SessionRepository, UserRepository,
    WeightRepository,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use peso_shared::{Goal, GoalId, Session, User, UserId, Weight, WeightId};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, user: &User) -> RepoResult<()> {
        self.users
            .write()
            .await
            .insert(user.id().clone(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> RepoResult<User> {
        self.users
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("user {}", id)))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<User> {
        let users = self.users.read().await;
        users
            .values()
            .filter(|u| u.email() == email)
            .max_by_key(|u| (u.is_active(), u.created_at()))
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("user with email {}", email)))
    }

    async fn find_by_name(&self, name: &str) -> RepoResult<User> {
        let users = self.users.read().await;
        users
            .values()
            .filter(|u| u.name() == name)
            .min_by_key(|u| u.created_at())
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("user named {}", name)))
    }

    async fn find_active(&self) -> RepoResult<Vec<User>> {
        let users = self.users.read().await;
        let mut active: Vec<User> = users.values().filter(|u| u.is_active()).cloned().collect();
        active.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(active)
    }

    async fn exists(&self, id: &UserId) -> RepoResult<bool> {
        Ok(self.users.read().await.contains_key(id))
    }

    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .any(|u| u.is_active() && u.email() == email))
    }
}

#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, expired ones included
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn save(&self, session: &Session) -> RepoResult<()> {
        let mut sessions = self.sessions.write().await;
        // Upsert by id: a re-saved session may carry a new token
        sessions.retain(|_, s| s.id() != session.id());
        sessions.insert(session.token().to_string(), session.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> RepoResult<Session> {
        self.sessions
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound("session".to_string()))
    }

    async fn delete_by_token(&self, token: &str) -> RepoResult<()> {
        self.sessions.write().await.remove(token);
        Ok(())
    }

    async fn delete_by_user_id(&self, user_id: &UserId) -> RepoResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.user_id() != user_id);
        Ok((before - sessions.len()) as u64)
    }

    async fn delete_expired(&self) -> RepoResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        Ok((before - sessions.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemoryWeightRepository {
    weights: RwLock<HashMap<WeightId, Weight>>,
}

impl InMemoryWeightRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn for_user(&self, user_id: &UserId) -> Vec<Weight> {
        self.weights
            .read()
            .await
            .values()
            .filter(|w| w.user_id() == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl WeightRepository for InMemoryWeightRepository {
    async fn save(&self, weight: &Weight) -> RepoResult<()> {
        self.weights
            .write()
            .await
            .insert(weight.id().clone(), weight.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &WeightId) -> RepoResult<Weight> {
        self.weights
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("weight {}", id)))
    }

    async fn find_by_user_id(&self, user_id: &UserId, limit: usize) -> RepoResult<Vec<Weight>> {
        let mut weights = self.for_user(user_id).await;
        weights.sort_by_key(|w| std::cmp::Reverse(w.measured_at()));
        weights.truncate(limit);
        Ok(weights)
    }

    async fn find_by_user_id_and_period(
        &self,
        user_id: &UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepoResult<Vec<Weight>> {
        let mut weights: Vec<Weight> = self
            .for_user(user_id)
            .await
            .into_iter()
            .filter(|w| w.measured_at() >= from && w.measured_at() <= to)
            .collect();
        weights.sort_by_key(|w| w.measured_at());
        Ok(weights)
    }

    async fn find_latest_by_user_id(&self, user_id: &UserId) -> RepoResult<Weight> {
        self.for_user(user_id)
            .await
            .into_iter()
            .max_by_key(|w| w.measured_at())
            .ok_or_else(|| RepositoryError::NotFound(format!("weights for user {}", user_id)))
    }

    async fn count_by_user_id_and_date(
        &self,
        user_id: &UserId,
        date: DateTime<Utc>,
    ) -> RepoResult<usize> {
        Ok(self
            .for_user(user_id)
            .await
            .iter()
            .filter(|w| w.is_same_day(date))
            .count())
    }

    async fn delete(&self, id: &WeightId) -> RepoResult<()> {
        self.weights
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(format!("weight {}", id)))
    }
}

#[derive(Default)]
pub struct InMemoryGoalRepository {
    goals: RwLock<HashMap<GoalId, Goal>>,
}

impl InMemoryGoalRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GoalRepository for InMemoryGoalRepository {
    async fn save(&self, goal: &Goal) -> RepoResult<()> {
        self.goals
            .write()
            .await
            .insert(goal.id().clone(), goal.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &GoalId) -> RepoResult<Goal> {
        self.goals
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("goal {}", id)))
    }

    async fn find_active_by_user_id(&self, user_id: &UserId) -> RepoResult<Goal> {
        self.goals
            .read()
            .await
            .values()
            .filter(|g| g.user_id() == user_id && g.is_active())
            .max_by_key(|g| g.created_at())
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("active goal for user {}", user_id)))
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> RepoResult<Vec<Goal>> {
        let mut goals: Vec<Goal> = self
            .goals
            .read()
            .await
            .values()
            .filter(|g| g.user_id() == user_id)
            .cloned()
            .collect();
        goals.sort_by_key(|g| std::cmp::Reverse(g.created_at()));
        Ok(goals)
    }

    async fn deactivate_by_user_id(&self, user_id: &UserId) -> RepoResult<u64> {
        let mut goals = self.goals.write().await;
        let mut changed = 0;
        for goal in goals
            .values_mut()
            .filter(|g| g.user_id() == user_id && g.is_active())
        {
            goal.deactivate();
            changed += 1;
        }
        Ok(changed)
    }

    async fn delete(&self, id: &GoalId) -> RepoResult<()> {
        self.goals
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(format!("goal {}", id)))
    }
}
