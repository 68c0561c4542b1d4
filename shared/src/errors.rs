//! Error types for the Peso domain

use thiserror::Error;

/// Validation failures raised while constructing value objects and entities
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("user ID cannot be empty")]
    EmptyUserId,

    #[error("user ID too long")]
    UserIdTooLong,

    #[error("weight ID cannot be empty")]
    EmptyWeightId,

    #[error("goal ID cannot be empty")]
    EmptyGoalId,

    #[error("session ID cannot be empty")]
    EmptySessionId,

    #[error("invalid session ID format")]
    InvalidSessionId,

    #[error("weight must be positive")]
    WeightInvalid,

    #[error("weight must be at least 10kg")]
    WeightTooLow,

    #[error("weight must be at most 500kg")]
    WeightTooHigh,

    #[error("invalid weight unit: {0}")]
    InvalidWeightUnit(String),

    #[error("invalid date")]
    InvalidDate,

    #[error("target date cannot be in the past")]
    PastDate,

    #[error("measurement date cannot be in the future")]
    FutureMeasurement,

    #[error("weight value cannot be zero")]
    ZeroWeight,

    #[error("target weight cannot be zero")]
    ZeroTargetWeight,

    #[error("user name cannot be empty")]
    EmptyName,

    #[error("password must be at least 8 characters")]
    PasswordTooShort,
}

/// Convenience alias for domain results
pub type DomainResult<T> = Result<T, DomainError>;
