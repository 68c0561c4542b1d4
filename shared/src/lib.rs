//! Peso Shared Library
//!
//! Domain value objects and entities for weight and goal tracking. This
//! crate performs no I/O; persistence and services live in the backend.

pub mod calendar;
pub mod errors;
pub mod goal;
pub mod ids;
pub mod session;
pub mod target_date;
pub mod units;
pub mod user;
pub mod validation;
pub mod weight;

pub use errors::{DomainError, DomainResult};
pub use goal::Goal;
pub use ids::{GoalId, SessionId, UserId, WeightId};
pub use session::{Session, SESSION_LIFETIME_DAYS};
pub use target_date::TargetDate;
pub use units::WeightUnit;
pub use user::{Credential, User, MIN_PASSWORD_LENGTH};
pub use weight::{Weight, WeightValue, MAX_WEIGHT_VALUE, MIN_WEIGHT_VALUE};
