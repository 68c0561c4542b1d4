//! Calendar-day helpers
//!
//! All day boundaries are computed in UTC, the timezone every timestamp in
//! the system is stored in.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// Midnight at the start of the day containing `at`
pub fn start_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    midnight(at.date_naive())
}

/// Last representable instant of the day containing `at`
pub fn end_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day(at) + Duration::days(1) - Duration::nanoseconds(1)
}

/// Midnight UTC of a calendar date
pub fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Today's calendar date
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
