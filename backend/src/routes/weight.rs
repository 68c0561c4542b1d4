//! Weight measurement API routes

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::{TimePeriod, WeightTrend};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use chrono::{DateTime, Utc};
use peso_shared::{Weight, WeightId, WeightUnit, WeightValue};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Create weight routes
pub fn weight_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_weight_history).post(record_weight))
        .route("/recent", get(get_recent_weights))
        .route("/latest", get(get_latest_weight))
        .route("/trend", get(get_weight_trend))
        .route("/:id", delete(delete_weight))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecordWeightRequest {
    pub value: f64,
    /// `kg` or `lb`; defaults to kg
    pub unit: Option<String>,
    /// Defaults to now
    pub measured_at: Option<DateTime<Utc>>,
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

impl PeriodQuery {
    /// Unknown or missing periods mean the last month
    fn period(&self) -> TimePeriod {
        self.period
            .as_deref()
            .and_then(|p| p.parse().ok())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    #[serde(default)]
    pub limit: usize,
}

#[derive(Debug, Serialize)]
pub struct WeightResponse {
    pub id: String,
    pub value: f64,
    pub unit: WeightUnit,
    pub value_kg: f64,
    pub measured_at: DateTime<Utc>,
    pub notes: String,
    pub is_recent: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Weight> for WeightResponse {
    fn from(weight: &Weight) -> Self {
        Self {
            id: weight.id().to_string(),
            value: weight.value().as_f64(),
            unit: weight.unit(),
            value_kg: weight.unit().to_kg(weight.value().as_f64()),
            measured_at: weight.measured_at(),
            notes: weight.notes().to_string(),
            is_recent: weight.is_recent(),
            created_at: weight.created_at(),
        }
    }
}

fn to_responses(weights: &[Weight]) -> Vec<WeightResponse> {
    weights.iter().map(WeightResponse::from).collect()
}

/// POST /api/v1/weights
async fn record_weight(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<RecordWeightRequest>,
) -> ApiResult<(StatusCode, Json<WeightResponse>)> {
    req.validate()?;

    let unit = match req.unit.as_deref() {
        Some(unit) => WeightUnit::new(unit)?,
        None => WeightUnit::default(),
    };
    let value = WeightValue::new(req.value)?;

    let weight = state
        .weights
        .record_weight(
            auth.user_id(),
            value,
            unit,
            req.measured_at.unwrap_or_else(Utc::now),
            req.notes.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(WeightResponse::from(&weight))))
}

/// GET /api/v1/weights?period=week|month|3months|6months|year|all
async fn get_weight_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Json<Vec<WeightResponse>>> {
    let weights = state
        .weights
        .get_weight_history(auth.user_id(), query.period())
        .await?;
    Ok(Json(to_responses(&weights)))
}

/// GET /api/v1/weights/recent?limit=
async fn get_recent_weights(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<RecentQuery>,
) -> ApiResult<Json<Vec<WeightResponse>>> {
    let weights = state
        .weights
        .get_recent_weights(auth.user_id(), query.limit)
        .await?;
    Ok(Json(to_responses(&weights)))
}

/// GET /api/v1/weights/latest
async fn get_latest_weight(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<WeightResponse>> {
    let weight = state.weights.get_latest_weight(auth.user_id()).await?;
    Ok(Json(WeightResponse::from(&weight)))
}

/// GET /api/v1/weights/trend?period=
async fn get_weight_trend(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Json<WeightTrend>> {
    let trend = state
        .weights
        .calculate_weight_trend(auth.user_id(), query.period())
        .await?;
    Ok(Json(trend))
}

/// DELETE /api/v1/weights/:id
async fn delete_weight(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let weight_id = WeightId::new(&id).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    state.weights.delete_weight(auth.user_id(), &weight_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
