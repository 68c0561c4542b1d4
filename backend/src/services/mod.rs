//! Business logic services
//!
//! Services hold no state of their own; every call is a read-modify-write
//! against the repositories they were built with.

pub mod auth;
pub mod error;
pub mod goals;
pub mod weight;

pub use auth::AuthService;
pub use error::{AuthError, ErrorKind, TrackingError};
pub use goals::{GoalProgress, GoalTracker};
pub use weight::{TimePeriod, TrendDirection, WeightTracker, WeightTrend};

use crate::repositories::UserRepository;
use chrono::Utc;
use peso_shared::{User, UserId};
use std::sync::atomic::{AtomicI64, Ordering};

/// Build an identifier of the form `{prefix}_{user}_{nanos}`.
///
/// The timestamp part is strictly increasing within the process, so two ids
/// minted in the same nanosecond still differ.
pub(crate) fn timestamped_id(prefix: &str, user_id: &UserId) -> String {
    static LAST: AtomicI64 = AtomicI64::new(0);

    let now = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let mut prev = LAST.load(Ordering::Relaxed);
    let stamp = loop {
        let candidate = now.max(prev + 1);
        match LAST.compare_exchange_weak(prev, candidate, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => break candidate,
            Err(actual) => prev = actual,
        }
    };

    format!("{}_{}_{}", prefix, user_id, stamp)
}

/// Resolve a user for the trackers, separating absence from storage failure
pub(crate) async fn require_user(
    users: &dyn UserRepository,
    user_id: &UserId,
) -> Result<User, TrackingError> {
    users.find_by_id(user_id).await.map_err(|err| {
        if err.is_not_found() {
            TrackingError::UserNotFound
        } else {
            TrackingError::repository("load user")(err)
        }
    })
}
