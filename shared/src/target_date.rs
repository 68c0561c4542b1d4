//! Goal target dates

use crate::calendar;
use crate::errors::{DomainError, DomainResult};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Calendar date a goal should be reached by
///
/// New dates must be today or later. Past-ness is evaluated against the
/// clock on every query, so a stored date can become past over time.
///
/// Deserialization goes through [`TargetDate::new`], so it rejects past
/// dates. Stored goals use [`TargetDate::reconstruct`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "NaiveDate", into = "NaiveDate")]
pub struct TargetDate(NaiveDate);

impl TargetDate {
    /// Build a target date, rejecting impossible dates (e.g. 30 February)
    /// and dates before today.
    pub fn new(year: i32, month: u32, day: u32) -> DomainResult<Self> {
        Self::new_relative_to(year, month, day, calendar::today())
    }

    /// Same as [`TargetDate::new`] with an explicit notion of "today"
    pub fn new_relative_to(year: i32, month: u32, day: u32, today: NaiveDate) -> DomainResult<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or(DomainError::InvalidDate)?;
        if date < today {
            return Err(DomainError::PastDate);
        }
        Ok(Self(date))
    }

    /// Rebuild a stored date. Dates that have since passed are accepted.
    pub fn reconstruct(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn is_past(&self) -> bool {
        self.is_past_on(calendar::today())
    }

    pub fn is_past_on(&self, today: NaiveDate) -> bool {
        self.0 < today
    }

    /// Whole days from today until the target; negative once passed
    pub fn days_until(&self) -> i64 {
        self.days_until_from(calendar::today())
    }

    pub fn days_until_from(&self, today: NaiveDate) -> i64 {
        (self.0 - today).num_days()
    }

    pub fn to_date(&self) -> NaiveDate {
        self.0
    }

    /// Midnight UTC on the target date
    pub fn to_datetime(&self) -> DateTime<Utc> {
        calendar::midnight(self.0)
    }
}

impl TryFrom<NaiveDate> for TargetDate {
    type Error = DomainError;

    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        Self::new(date.year(), date.month(), date.day())
    }
}

impl From<TargetDate> for NaiveDate {
    fn from(date: TargetDate) -> Self {
        date.0
    }
}

impl fmt::Display for TargetDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}/{:04}", self.day(), self.month(), self.year())
    }
}
