//! Goal repository for PostgreSQL

use super::{GoalRepository, RepoResult, RepositoryError};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use peso_shared::{Goal, GoalId, TargetDate, UserId, WeightUnit, WeightValue};
use sqlx::PgPool;

/// Goal record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GoalRecord {
    pub id: String,
    pub user_id: String,
    pub target_weight: f64,
    pub unit: String,
    pub target_date: NaiveDate,
    pub description: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GoalRecord {
    pub fn into_domain(self) -> RepoResult<Goal> {
        Ok(Goal::reconstruct(
            GoalId::new(&self.id)?,
            UserId::new(&self.user_id)?,
            WeightValue::new(self.target_weight)?,
            WeightUnit::new(&self.unit)?,
            TargetDate::reconstruct(self.target_date),
            self.description,
            self.active,
            self.created_at,
            self.updated_at,
        ))
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, target_weight, unit, target_date, description, active,
           created_at, updated_at
    FROM goals
"#;

/// Goal repository backed by PostgreSQL
#[derive(Clone)]
pub struct PgGoalRepository {
    pool: PgPool,
}

impl PgGoalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GoalRepository for PgGoalRepository {
    async fn save(&self, goal: &Goal) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO goals (id, user_id, target_weight, unit, target_date, description,
                               active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                target_weight = EXCLUDED.target_weight,
                unit = EXCLUDED.unit,
                target_date = EXCLUDED.target_date,
                description = EXCLUDED.description,
                active = EXCLUDED.active,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(goal.id().as_str())
        .bind(goal.user_id().as_str())
        .bind(goal.target_weight().as_f64())
        .bind(goal.unit().as_str())
        .bind(goal.target_date().to_date())
        .bind(goal.description())
        .bind(goal.is_active())
        .bind(goal.created_at())
        .bind(goal.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &GoalId) -> RepoResult<Goal> {
        sqlx::query_as::<_, GoalRecord>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("goal {}", id)))?
            .into_domain()
    }

    async fn find_active_by_user_id(&self, user_id: &UserId) -> RepoResult<Goal> {
        sqlx::query_as::<_, GoalRecord>(&format!(
            "{SELECT_COLUMNS} WHERE user_id = $1 AND active = TRUE ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("active goal for user {}", user_id)))?
        .into_domain()
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> RepoResult<Vec<Goal>> {
        let records = sqlx::query_as::<_, GoalRecord>(&format!(
            "{SELECT_COLUMNS} WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        records.into_iter().map(GoalRecord::into_domain).collect()
    }

    async fn deactivate_by_user_id(&self, user_id: &UserId) -> RepoResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE goals
            SET active = FALSE, updated_at = NOW()
            WHERE user_id = $1 AND active = TRUE
            "#,
        )
        .bind(user_id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: &GoalId) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM goals WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("goal {}", id)));
        }
        Ok(())
    }
}
