//! Weight tracking service
//!
//! Provides business logic for weight tracking including:
//! - Recording measurements under a per-day cap
//! - History windows and recent/latest lookups
//! - Trend direction and weekly rate over a window
//! - Owner-checked deletion

use super::{require_user, timestamped_id, TrackingError};
use crate::repositories::{UserRepository, WeightRepository};
use chrono::{DateTime, Datelike, Duration, Months, TimeZone, Utc};
use peso_shared::{calendar, UserId, Weight, WeightId, WeightUnit, WeightValue};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Maximum measurements a user may record on one calendar day
pub const MAX_DAILY_WEIGHT_RECORDINGS: usize = 10;

/// Limit used when a caller asks for zero recent weights
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Changes within this many kilograms count as stable
const TREND_NOISE_KG: f64 = 0.1;

/// History window ending now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimePeriod {
    LastWeek,
    #[default]
    LastMonth,
    Last3Months,
    Last6Months,
    LastYear,
    All,
}

impl TimePeriod {
    /// Lower bound of the window ending at `now`. `All` starts at 2020-01-01 UTC.
    ///
    /// Month windows keep the day of month and roll a missing day over into
    /// the next month, so one month before 31 March is 2 March in a leap year.
    pub fn start_from(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let months_back = |months: u32| {
            let into_month = Duration::days(i64::from(now.day()) - 1);
            (now - into_month)
                .checked_sub_months(Months::new(months))
                .map(|first| first + into_month)
                .unwrap_or(now - Duration::days(30 * i64::from(months)))
        };

        match self {
            TimePeriod::LastWeek => now - Duration::days(7),
            TimePeriod::LastMonth => months_back(1),
            TimePeriod::Last3Months => months_back(3),
            TimePeriod::Last6Months => months_back(6),
            TimePeriod::LastYear => months_back(12),
            TimePeriod::All => history_epoch(),
        }
    }
}

fn history_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

impl FromStr for TimePeriod {
    type Err = String;

    /// Accepts the short query forms (`week`, `3months`, ...) and the snake case names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" | "last_week" => Ok(TimePeriod::LastWeek),
            "month" | "last_month" => Ok(TimePeriod::LastMonth),
            "3months" | "last_3_months" => Ok(TimePeriod::Last3Months),
            "6months" | "last_6_months" => Ok(TimePeriod::Last6Months),
            "year" | "last_year" => Ok(TimePeriod::LastYear),
            "all" => Ok(TimePeriod::All),
            other => Err(format!("unknown period: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    NoData,
}

impl TrendDirection {
    /// Classify a signed change in kilograms
    pub fn classify(total_change: f64) -> Self {
        if total_change > TREND_NOISE_KG {
            TrendDirection::Increasing
        } else if total_change < -TREND_NOISE_KG {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }
}

/// Weight change across a window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightTrend {
    pub direction: TrendDirection,
    /// Magnitude of the change; the sign lives in `direction`
    pub total_change: f64,
    pub average_change_per_week: f64,
    pub start_weight: WeightValue,
    pub end_weight: WeightValue,
    pub data_points: usize,
}

impl WeightTrend {
    fn no_data(data_points: usize) -> Self {
        Self {
            direction: TrendDirection::NoData,
            total_change: 0.0,
            average_change_per_week: 0.0,
            start_weight: WeightValue::ZERO,
            end_weight: WeightValue::ZERO,
            data_points,
        }
    }

    /// Trend over measurements sorted by ascending `measured_at`
    pub fn from_history(weights: &[Weight]) -> Self {
        let (first, last) = match weights {
            [first, .., last] => (first, last),
            _ => return Self::no_data(weights.len()),
        };

        let start_weight = first.value();
        let end_weight = last.value();
        let total_change = end_weight.subtract(start_weight).as_f64();

        let elapsed = last.measured_at() - first.measured_at();
        let days = elapsed.num_milliseconds() as f64 / 86_400_000.0;
        let weeks = days / 7.0;
        let average_change_per_week = if weeks > 0.0 {
            total_change / weeks
        } else {
            0.0
        };

        Self {
            direction: TrendDirection::classify(total_change),
            total_change: total_change.abs(),
            average_change_per_week,
            start_weight,
            end_weight,
            data_points: weights.len(),
        }
    }
}

/// Weight tracking service
#[derive(Clone)]
pub struct WeightTracker {
    users: Arc<dyn UserRepository>,
    weights: Arc<dyn WeightRepository>,
}

impl WeightTracker {
    pub fn new(users: Arc<dyn UserRepository>, weights: Arc<dyn WeightRepository>) -> Self {
        Self { users, weights }
    }

    /// Record a measurement for an active user
    #[instrument(skip(self, notes), fields(user_id = %user_id))]
    pub async fn record_weight(
        &self,
        user_id: &UserId,
        value: WeightValue,
        unit: WeightUnit,
        measured_at: DateTime<Utc>,
        notes: &str,
    ) -> Result<Weight, TrackingError> {
        let user = require_user(self.users.as_ref(), user_id).await?;
        if !user.is_active() {
            return Err(TrackingError::UserNotActive);
        }

        let day_start = calendar::start_of_day(measured_at);
        let daily_count = self
            .weights
            .count_by_user_id_and_date(user_id, day_start)
            .await
            .map_err(TrackingError::repository("check daily recording count"))?;

        if daily_count >= MAX_DAILY_WEIGHT_RECORDINGS {
            warn!(daily_count, "Daily recording limit reached");
            return Err(TrackingError::MaxDailyRecordingsExceeded);
        }

        let id = WeightId::new(&timestamped_id("weight", user_id))?;
        let weight = Weight::new(id, user_id.clone(), value, unit, measured_at, notes)?;

        self.weights
            .save(&weight)
            .await
            .map_err(TrackingError::repository("save weight record"))?;

        info!(weight_id = %weight.id(), value = %value, "Weight recorded");
        Ok(weight)
    }

    /// Measurements inside `period`, oldest first
    pub async fn get_weight_history(
        &self,
        user_id: &UserId,
        period: TimePeriod,
    ) -> Result<Vec<Weight>, TrackingError> {
        let to = Utc::now();
        let from = period.start_from(to);

        self.weights
            .find_by_user_id_and_period(user_id, from, to)
            .await
            .map_err(TrackingError::repository("retrieve weight history"))
    }

    /// Newest first. A `limit` of zero means [`DEFAULT_RECENT_LIMIT`].
    pub async fn get_recent_weights(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Weight>, TrackingError> {
        require_user(self.users.as_ref(), user_id).await?;
        let limit = if limit == 0 { DEFAULT_RECENT_LIMIT } else { limit };

        self.weights
            .find_by_user_id(user_id, limit)
            .await
            .map_err(TrackingError::repository("retrieve recent weights"))
    }

    pub async fn get_latest_weight(&self, user_id: &UserId) -> Result<Weight, TrackingError> {
        require_user(self.users.as_ref(), user_id).await?;

        self.weights
            .find_latest_by_user_id(user_id)
            .await
            .map_err(|err| {
                if err.is_not_found() {
                    TrackingError::NoCurrentWeight
                } else {
                    TrackingError::repository("retrieve latest weight")(err)
                }
            })
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn calculate_weight_trend(
        &self,
        user_id: &UserId,
        period: TimePeriod,
    ) -> Result<WeightTrend, TrackingError> {
        let history = self.get_weight_history(user_id, period).await?;
        let trend = WeightTrend::from_history(&history);
        debug!(direction = ?trend.direction, data_points = trend.data_points, "Trend calculated");
        Ok(trend)
    }

    /// Delete a measurement owned by `user_id`
    #[instrument(skip(self), fields(user_id = %user_id, weight_id = %weight_id))]
    pub async fn delete_weight(
        &self,
        user_id: &UserId,
        weight_id: &WeightId,
    ) -> Result<(), TrackingError> {
        require_user(self.users.as_ref(), user_id).await?;

        let weight = self.weights.find_by_id(weight_id).await.map_err(|err| {
            if err.is_not_found() {
                TrackingError::WeightNotFound
            } else {
                TrackingError::repository("load weight")(err)
            }
        })?;

        if weight.user_id() != user_id {
            warn!(owner = %weight.user_id(), "Refusing to delete another user's weight");
            return Err(TrackingError::WeightNotOwned);
        }

        self.weights
            .delete(weight_id)
            .await
            .map_err(TrackingError::repository("delete weight"))?;

        info!("Weight deleted");
        Ok(())
    }
}
