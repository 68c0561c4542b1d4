//! Weight goals

use crate::errors::{DomainError, DomainResult};
use crate::ids::{GoalId, UserId};
use crate::target_date::TargetDate;
use crate::units::WeightUnit;
use crate::weight::WeightValue;
use chrono::{DateTime, Utc};

/// A target weight a user wants to reach by a date
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    id: GoalId,
    user_id: UserId,
    target_weight: WeightValue,
    unit: WeightUnit,
    target_date: TargetDate,
    description: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Goal {
    /// Create a new, active goal
    pub fn new(
        id: GoalId,
        user_id: UserId,
        target_weight: WeightValue,
        unit: WeightUnit,
        target_date: TargetDate,
        description: impl Into<String>,
    ) -> DomainResult<Self> {
        if user_id.is_empty() {
            return Err(DomainError::EmptyUserId);
        }
        if target_weight.is_zero() {
            return Err(DomainError::ZeroTargetWeight);
        }

        let now = Utc::now();
        Ok(Self {
            id,
            user_id,
            target_weight,
            unit,
            target_date,
            description: description.into(),
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild a stored goal. The target date may already be past.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: GoalId,
        user_id: UserId,
        target_weight: WeightValue,
        unit: WeightUnit,
        target_date: TargetDate,
        description: String,
        active: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            target_weight,
            unit,
            target_date,
            description,
            active,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &GoalId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn target_weight(&self) -> WeightValue {
        self.target_weight
    }

    pub fn unit(&self) -> WeightUnit {
        self.unit
    }

    pub fn target_date(&self) -> TargetDate {
        self.target_date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn activate(&mut self) {
        self.active = true;
        self.updated_at = Utc::now();
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.updated_at = Utc::now();
    }

    pub fn update_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.updated_at = Utc::now();
    }

    pub fn is_expired(&self) -> bool {
        self.target_date.is_past()
    }

    pub fn days_remaining(&self) -> i64 {
        self.target_date.days_until()
    }
}
