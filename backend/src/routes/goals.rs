//! Goal API routes

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::{GoalProgress, TrackingError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use peso_shared::{Goal, GoalId, TargetDate, WeightUnit, WeightValue};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Create goal routes
pub fn goal_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_goals).post(set_goal))
        .route("/active", get(get_active_goal))
        .route("/progress", get(get_progress))
        .route("/:id/deactivate", post(deactivate_goal))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetGoalRequest {
    pub target_weight: f64,
    pub unit: Option<String>,
    pub target_date: NaiveDate,
    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct GoalResponse {
    pub id: String,
    pub target_weight: f64,
    pub unit: WeightUnit,
    pub target_date: NaiveDate,
    /// DD/MM/YYYY
    pub target_date_display: String,
    pub description: String,
    pub active: bool,
    pub days_remaining: i64,
    pub is_expired: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Goal> for GoalResponse {
    fn from(goal: &Goal) -> Self {
        Self {
            id: goal.id().to_string(),
            target_weight: goal.target_weight().as_f64(),
            unit: goal.unit(),
            target_date: goal.target_date().to_date(),
            target_date_display: goal.target_date().to_string(),
            description: goal.description().to_string(),
            active: goal.is_active(),
            days_remaining: goal.days_remaining(),
            is_expired: goal.is_expired(),
            created_at: goal.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub goal: GoalResponse,
    pub current_weight: f64,
    /// Measurement closest to when the goal was set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_weight: Option<f64>,
    pub weight_to_lose: f64,
    pub days_remaining: i64,
    pub weight_per_day: f64,
    pub progress_percent: f64,
    pub is_on_track: bool,
}

impl ProgressResponse {
    fn new(progress: GoalProgress, starting_weight: Option<f64>) -> Self {
        Self {
            goal: GoalResponse::from(&progress.goal),
            current_weight: progress.current_weight.as_f64(),
            starting_weight,
            weight_to_lose: progress.weight_to_lose,
            days_remaining: progress.days_remaining,
            weight_per_day: progress.weight_per_day,
            progress_percent: progress.progress_percent,
            is_on_track: progress.is_on_track,
        }
    }
}

/// POST /api/v1/goals
async fn set_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SetGoalRequest>,
) -> ApiResult<(StatusCode, Json<GoalResponse>)> {
    req.validate()?;

    let unit = match req.unit.as_deref() {
        Some(unit) => WeightUnit::new(unit)?,
        None => WeightUnit::default(),
    };
    let target_weight = WeightValue::new(req.target_weight)?;
    let date = req.target_date;
    let target_date = TargetDate::new(date.year(), date.month(), date.day())?;

    let goal = state
        .goals
        .set_goal(auth.user_id(), target_weight, unit, target_date, &req.description)
        .await?;

    Ok((StatusCode::CREATED, Json(GoalResponse::from(&goal))))
}

/// GET /api/v1/goals
async fn get_goals(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<GoalResponse>>> {
    let goals = state.goals.get_goal_history(auth.user_id()).await?;
    Ok(Json(goals.iter().map(GoalResponse::from).collect()))
}

/// GET /api/v1/goals/active
async fn get_active_goal(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<GoalResponse>> {
    let goal = state.goals.get_active_goal(auth.user_id()).await?;
    Ok(Json(GoalResponse::from(&goal)))
}

/// GET /api/v1/goals/progress
async fn get_progress(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ProgressResponse>> {
    let progress = state.goals.calculate_progress(auth.user_id()).await?;

    let starting_weight = match state
        .goals
        .get_starting_weight_for_goal(auth.user_id(), progress.goal.created_at())
        .await
    {
        Ok(weight) => Some(weight.value().as_f64()),
        Err(TrackingError::NoCurrentWeight) => None,
        Err(err) => return Err(err.into()),
    };

    Ok(Json(ProgressResponse::new(progress, starting_weight)))
}

/// POST /api/v1/goals/:id/deactivate
async fn deactivate_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let goal_id = GoalId::new(&id).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    state.goals.deactivate_goal_for(auth.user_id(), &goal_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
