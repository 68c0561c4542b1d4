//! Service error types
//!
//! Every failure a service returns falls into one [`ErrorKind`]. Repository
//! failures keep their original error as the source and gain the name of the
//! step that failed.

use crate::repositories::RepositoryError;
use peso_shared::{DomainError, User};
use thiserror::Error;

/// Broad category of a service failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Policy,
    Authorization,
    Infrastructure,
}

/// Failures from [`WeightTracker`](super::WeightTracker) and [`GoalTracker`](super::GoalTracker)
#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("user not found")]
    UserNotFound,

    #[error("user is not active")]
    UserNotActive,

    #[error("maximum daily weight recordings exceeded")]
    MaxDailyRecordingsExceeded,

    #[error("weight not found")]
    WeightNotFound,

    #[error("weight belongs to another user")]
    WeightNotOwned,

    #[error("no current weight recorded")]
    NoCurrentWeight,

    #[error("target weight is the same as current weight")]
    SameWeight,

    #[error("user already has an active goal")]
    ActiveGoalExists,

    #[error("goal requires an unrealistic rate of weight change")]
    UnrealisticGoal,

    #[error("no active goal found")]
    NoActiveGoal,

    #[error("goal not found")]
    GoalNotFound,

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("failed to {context}: {source}")]
    Repository {
        context: &'static str,
        #[source]
        source: RepositoryError,
    },
}

impl TrackingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackingError::UserNotFound
            | TrackingError::WeightNotFound
            | TrackingError::NoCurrentWeight
            | TrackingError::NoActiveGoal
            | TrackingError::GoalNotFound => ErrorKind::NotFound,
            TrackingError::Validation(_) => ErrorKind::Validation,
            TrackingError::UserNotActive
            | TrackingError::MaxDailyRecordingsExceeded
            | TrackingError::SameWeight
            | TrackingError::ActiveGoalExists
            | TrackingError::UnrealisticGoal => ErrorKind::Policy,
            TrackingError::WeightNotOwned => ErrorKind::Authorization,
            TrackingError::Repository { .. } => ErrorKind::Infrastructure,
        }
    }

    /// Wrap a repository failure with the step that produced it
    pub(crate) fn repository(context: &'static str) -> impl FnOnce(RepositoryError) -> Self {
        move |source| TrackingError::Repository { context, source }
    }
}

/// Failures from [`AuthService`](super::AuthService)
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email already exists")]
    EmailAlreadyExists,

    #[error("user not found")]
    UserNotFound,

    #[error("session expired")]
    SessionExpired,

    /// The account exists but has never had a password set
    #[error("user has no password set")]
    NoPassword(Box<User>),

    #[error("invalid email format")]
    InvalidEmail,

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("failed to hash password: {0}")]
    PasswordHashing(String),

    #[error("failed to {context}: {source}")]
    Repository {
        context: &'static str,
        #[source]
        source: RepositoryError,
    },
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::InvalidEmail | AuthError::Validation(_) => ErrorKind::Validation,
            AuthError::EmailAlreadyExists | AuthError::SessionExpired | AuthError::NoPassword(_) => {
                ErrorKind::Policy
            }
            AuthError::InvalidCredentials => ErrorKind::Authorization,
            AuthError::PasswordHashing(_) | AuthError::Repository { .. } => {
                ErrorKind::Infrastructure
            }
        }
    }

    pub(crate) fn repository(context: &'static str) -> impl FnOnce(RepositoryError) -> Self {
        move |source| AuthError::Repository { context, source }
    }
}
