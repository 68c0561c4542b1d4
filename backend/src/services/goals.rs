//! Goals service for goal setting and progress tracking
//!
//! Provides business logic for:
//! - Goal creation behind a feasibility pipeline
//! - Active goal lookup and deactivation
//! - Starting weight lookup around goal creation
//! - Progress calculation against the latest measurement

use super::{require_user, timestamped_id, TrackingError};
use crate::repositories::{GoalRepository, UserRepository, WeightRepository};
use chrono::{DateTime, Duration, Utc};
use peso_shared::{Goal, GoalId, TargetDate, UserId, Weight, WeightUnit, WeightValue};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Targets closer than this to the current weight are rejected
const MIN_WEIGHT_DIFFERENCE_KG: f64 = 0.1;

/// Fastest change a goal may demand
const MAX_WEIGHT_CHANGE_PER_WEEK_KG: f64 = 2.0;

/// Daily change above which a goal is off track
const ON_TRACK_MAX_KG_PER_DAY: f64 = 0.3;

/// How far around goal creation a starting measurement is searched for
const STARTING_WEIGHT_WINDOW_DAYS: i64 = 7;

/// Progress towards the active goal
#[derive(Debug, Clone)]
pub struct GoalProgress {
    pub goal: Goal,
    pub current_weight: WeightValue,
    /// Distance to the target, always non-negative
    pub weight_to_lose: f64,
    pub days_remaining: i64,
    /// Change per day needed to reach the target in time
    pub weight_per_day: f64,
    pub progress_percent: f64,
    pub is_on_track: bool,
}

impl GoalProgress {
    /// Progress of `goal` with the user currently at `current_weight`
    pub fn compute(goal: Goal, current_weight: WeightValue, days_remaining: i64) -> Self {
        let weight_to_lose = current_weight.subtract(goal.target_weight()).as_f64();
        let remaining = weight_to_lose.abs();

        let weight_per_day = if days_remaining > 0 {
            remaining / days_remaining as f64
        } else {
            0.0
        };

        // Approximation: measures distance to target on a fixed 10kg scale
        // rather than against the weight the goal started from.
        let progress_percent = if remaining > 0.0 {
            ((1.0 - remaining / 10.0) * 100.0).max(0.0)
        } else {
            0.0
        };

        Self {
            goal,
            current_weight,
            weight_to_lose: remaining,
            days_remaining,
            weight_per_day,
            progress_percent,
            is_on_track: weight_per_day <= ON_TRACK_MAX_KG_PER_DAY,
        }
    }
}

/// Whether `weight_diff` kilograms can be reached within `days_until` days
pub fn is_feasible(weight_diff: f64, days_until: i64) -> bool {
    if days_until <= 0 {
        return false;
    }
    let weeks = days_until as f64 / 7.0;
    weight_diff.abs() / weeks <= MAX_WEIGHT_CHANGE_PER_WEEK_KG
}

/// Goal tracking service
#[derive(Clone)]
pub struct GoalTracker {
    users: Arc<dyn UserRepository>,
    weights: Arc<dyn WeightRepository>,
    goals: Arc<dyn GoalRepository>,
}

impl GoalTracker {
    pub fn new(
        users: Arc<dyn UserRepository>,
        weights: Arc<dyn WeightRepository>,
        goals: Arc<dyn GoalRepository>,
    ) -> Self {
        Self {
            users,
            weights,
            goals,
        }
    }

    async fn latest_weight(&self, user_id: &UserId) -> Result<Weight, TrackingError> {
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

    /// Set a new goal for a user.
    ///
    /// Checks run in order and stop at the first failure: the user must be
    /// active, have a measurement, want a target at least 0.1kg away, have no
    /// active goal, and need at most 2kg per week to get there.
    ///
    /// The active goal check and the save are separate repository calls, so
    /// two concurrent requests for one user can both pass it.
    #[instrument(skip(self, description), fields(user_id = %user_id))]
    pub async fn set_goal(
        &self,
        user_id: &UserId,
        target_weight: WeightValue,
        unit: WeightUnit,
        target_date: TargetDate,
        description: &str,
    ) -> Result<Goal, TrackingError> {
        let user = require_user(self.users.as_ref(), user_id).await?;
        if !user.is_active() {
            return Err(TrackingError::UserNotActive);
        }

        let current = self.latest_weight(user_id).await?;

        let weight_diff = (target_weight.as_f64() - current.value().as_f64()).abs();
        if weight_diff < MIN_WEIGHT_DIFFERENCE_KG {
            return Err(TrackingError::SameWeight);
        }

        match self.goals.find_active_by_user_id(user_id).await {
            Ok(_) => return Err(TrackingError::ActiveGoalExists),
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(TrackingError::repository("check active goal")(err)),
        }

        let days_until = target_date.days_until();
        if !is_feasible(weight_diff, days_until) {
            debug!(weight_diff, days_until, "Goal rejected as unrealistic");
            return Err(TrackingError::UnrealisticGoal);
        }

        let id = GoalId::new(&timestamped_id("goal", user_id))?;
        let goal = Goal::new(id, user_id.clone(), target_weight, unit, target_date, description)?;

        self.goals
            .save(&goal)
            .await
            .map_err(TrackingError::repository("save goal"))?;

        info!(goal_id = %goal.id(), target = %target_weight, target_date = %target_date, "Goal set");
        Ok(goal)
    }

    pub async fn get_active_goal(&self, user_id: &UserId) -> Result<Goal, TrackingError> {
        self.goals
            .find_active_by_user_id(user_id)
            .await
            .map_err(|err| {
                if err.is_not_found() {
                    TrackingError::NoActiveGoal
                } else {
                    TrackingError::repository("retrieve active goal")(err)
                }
            })
    }

    /// Every goal the user has set, newest first
    pub async fn get_goal_history(&self, user_id: &UserId) -> Result<Vec<Goal>, TrackingError> {
        require_user(self.users.as_ref(), user_id).await?;

        self.goals
            .find_by_user_id(user_id)
            .await
            .map_err(TrackingError::repository("retrieve goals"))
    }

    /// Measurement closest to `goal_created_at` within a week either side.
    ///
    /// Falls back to the latest measurement when the window is empty, even if
    /// that one was taken after the goal. Ties go to the earlier measurement.
    pub async fn get_starting_weight_for_goal(
        &self,
        user_id: &UserId,
        goal_created_at: DateTime<Utc>,
    ) -> Result<Weight, TrackingError> {
        let window = Duration::days(STARTING_WEIGHT_WINDOW_DAYS);
        let candidates = self
            .weights
            .find_by_user_id_and_period(user_id, goal_created_at - window, goal_created_at + window)
            .await
            .map_err(TrackingError::repository("retrieve weights around goal creation"))?;

        match candidates
            .into_iter()
            .min_by_key(|w| (w.measured_at() - goal_created_at).abs())
        {
            Some(closest) => Ok(closest),
            None => self.latest_weight(user_id).await,
        }
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn calculate_progress(&self, user_id: &UserId) -> Result<GoalProgress, TrackingError> {
        let goal = self.get_active_goal(user_id).await?;
        let current = self.latest_weight(user_id).await?;

        let days_remaining = goal.days_remaining();
        let progress = GoalProgress::compute(goal, current.value(), days_remaining);
        debug!(
            weight_to_lose = progress.weight_to_lose,
            days_remaining,
            on_track = progress.is_on_track,
            "Progress calculated"
        );
        Ok(progress)
    }

    #[instrument(skip(self), fields(goal_id = %goal_id))]
    pub async fn deactivate_goal(&self, goal_id: &GoalId) -> Result<(), TrackingError> {
        let mut goal = self.find_goal(goal_id).await?;
        goal.deactivate();

        self.goals
            .save(&goal)
            .await
            .map_err(TrackingError::repository("deactivate goal"))?;

        info!("Goal deactivated");
        Ok(())
    }

    /// Deactivate a goal on behalf of its owner.
    ///
    /// Goals of other users are reported as missing.
    pub async fn deactivate_goal_for(
        &self,
        user_id: &UserId,
        goal_id: &GoalId,
    ) -> Result<(), TrackingError> {
        let goal = self.find_goal(goal_id).await?;
        if goal.user_id() != user_id {
            warn!(goal_id = %goal_id, user_id = %user_id, "Goal owned by another user");
            return Err(TrackingError::GoalNotFound);
        }
        self.deactivate_goal(goal_id).await
    }

    async fn find_goal(&self, goal_id: &GoalId) -> Result<Goal, TrackingError> {
        self.goals.find_by_id(goal_id).await.map_err(|err| {
            if err.is_not_found() {
                TrackingError::GoalNotFound
            } else {
                TrackingError::repository("load goal")(err)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use rstest::rstest;

    fn goal_at(target_kg: f64, days_ahead: i64) -> Goal {
        let date = (Utc::now() + Duration::days(days_ahead)).date_naive();
        Goal::new(
            GoalId::new("g1").unwrap(),
            UserId::new("alice").unwrap(),
            WeightValue::new(target_kg).unwrap(),
            WeightUnit::Kg,
            TargetDate::new(date.year(), date.month(), date.day()).unwrap(),
            "",
        )
        .unwrap()
    }

    #[rstest]
    #[case(5, false)]
    #[case(10, true)]
    #[case(30, true)]
    fn test_on_track_threshold(#[case] days: i64, #[case] on_track: bool) {
        let progress = GoalProgress::compute(goal_at(65.0, days), WeightValue::new(68.0).unwrap(), days);

        assert!((progress.weight_to_lose - 3.0).abs() < 1e-9);
        assert_eq!(progress.is_on_track, on_track);
    }

    #[test]
    fn test_progress_heuristic() {
        let progress = GoalProgress::compute(goal_at(65.0, 30), WeightValue::new(68.0).unwrap(), 30);
        assert!((progress.progress_percent - 70.0).abs() < 1e-9);
        assert!((progress.weight_per_day - 0.1).abs() < 1e-9);

        let far = GoalProgress::compute(goal_at(60.0, 30), WeightValue::new(80.0).unwrap(), 30);
        assert_eq!(far.progress_percent, 0.0);
    }

    #[test]
    fn test_weight_to_lose_is_absolute_when_gaining() {
        let progress = GoalProgress::compute(goal_at(70.0, 20), WeightValue::new(68.0).unwrap(), 20);
        assert!((progress.weight_to_lose - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_days_left_means_zero_daily_rate() {
        let progress = GoalProgress::compute(goal_at(65.0, 0), WeightValue::new(68.0).unwrap(), 0);
        assert_eq!(progress.weight_per_day, 0.0);
        assert!(progress.is_on_track);
    }

    #[rstest]
    #[case(5.0, 0, false)]
    #[case(5.0, -3, false)]
    #[case(4.0, 14, true)]
    #[case(4.1, 14, false)]
    #[case(10.0, 70, true)]
    fn test_feasibility(#[case] diff: f64, #[case] days: i64, #[case] feasible: bool) {
        assert_eq!(is_feasible(diff, days), feasible);
    }
}
