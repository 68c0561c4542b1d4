//! Weight measurement repository for PostgreSQL

use super::{RepoResult, RepositoryError, WeightRepository};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use peso_shared::{calendar, UserId, Weight, WeightId, WeightUnit, WeightValue};
use sqlx::PgPool;

/// Weight record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WeightRecord {
    pub id: String,
    pub user_id: String,
    pub value: f64,
    pub unit: String,
    pub measured_at: DateTime<Utc>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl WeightRecord {
    /// Rebuild the domain measurement, rejecting rows that break the value rules
    pub fn into_domain(self) -> RepoResult<Weight> {
        Ok(Weight::reconstruct(
            WeightId::new(&self.id)?,
            UserId::new(&self.user_id)?,
            WeightValue::new(self.value)?,
            WeightUnit::new(&self.unit)?,
            self.measured_at,
            self.notes,
            self.created_at,
        ))
    }
}

const SELECT_COLUMNS: &str = "SELECT id, user_id, value, unit, measured_at, notes, created_at FROM weights";

/// Weight repository backed by PostgreSQL
#[derive(Clone)]
pub struct PgWeightRepository {
    pool: PgPool,
}

impl PgWeightRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_domain_all(records: Vec<WeightRecord>) -> RepoResult<Vec<Weight>> {
    records.into_iter().map(WeightRecord::into_domain).collect()
}

#[async_trait]
impl WeightRepository for PgWeightRepository {
    async fn save(&self, weight: &Weight) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO weights (id, user_id, value, unit, measured_at, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                value = EXCLUDED.value,
                unit = EXCLUDED.unit,
                measured_at = EXCLUDED.measured_at,
                notes = EXCLUDED.notes
            "#,
        )
        .bind(weight.id().as_str())
        .bind(weight.user_id().as_str())
        .bind(weight.value().as_f64())
        .bind(weight.unit().as_str())
        .bind(weight.measured_at())
        .bind(weight.notes())
        .bind(weight.created_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &WeightId) -> RepoResult<Weight> {
        let record = sqlx::query_as::<_, WeightRecord>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("weight {}", id)))?;

        record.into_domain()
    }

    async fn find_by_user_id(&self, user_id: &UserId, limit: usize) -> RepoResult<Vec<Weight>> {
        let records = sqlx::query_as::<_, WeightRecord>(&format!(
            "{SELECT_COLUMNS} WHERE user_id = $1 ORDER BY measured_at DESC LIMIT $2"
        ))
        .bind(user_id.as_str())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        into_domain_all(records)
    }

    async fn find_by_user_id_and_period(
        &self,
        user_id: &UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepoResult<Vec<Weight>> {
        let records = sqlx::query_as::<_, WeightRecord>(&format!(
            "{SELECT_COLUMNS} WHERE user_id = $1 AND measured_at >= $2 AND measured_at <= $3 \
             ORDER BY measured_at ASC"
        ))
        .bind(user_id.as_str())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        into_domain_all(records)
    }

    async fn find_latest_by_user_id(&self, user_id: &UserId) -> RepoResult<Weight> {
        let record = sqlx::query_as::<_, WeightRecord>(&format!(
            "{SELECT_COLUMNS} WHERE user_id = $1 ORDER BY measured_at DESC LIMIT 1"
        ))
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("weights for user {}", user_id)))?;

        record.into_domain()
    }

    async fn count_by_user_id_and_date(
        &self,
        user_id: &UserId,
        date: DateTime<Utc>,
    ) -> RepoResult<usize> {
        let day_start = calendar::start_of_day(date);
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM weights
            WHERE user_id = $1 AND measured_at >= $2 AND measured_at < $3
            "#,
        )
        .bind(user_id.as_str())
        .bind(day_start)
        .bind(day_start + Duration::days(1))
        .fetch_one(&self.pool)
        .await?;

        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn delete(&self, id: &WeightId) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM weights WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("weight {}", id)));
        }
        Ok(())
    }
}
