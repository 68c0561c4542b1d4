//! Weight measurements
//!
//! [`WeightValue`] is the validated magnitude, [`Weight`] a single recorded
//! measurement. Measurements are immutable after creation except for notes.

use crate::calendar;
use crate::errors::{DomainError, DomainResult};
use crate::ids::{UserId, WeightId};
use crate::units::WeightUnit;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest accepted body weight in kilograms
pub const MIN_WEIGHT_VALUE: f64 = 10.0;

/// Highest accepted body weight in kilograms
pub const MAX_WEIGHT_VALUE: f64 = 500.0;

/// How far back a measurement still counts as recent
const RECENT_WINDOW_DAYS: i64 = 7;

/// A body weight magnitude
///
/// Zero is the "unset" sentinel and can only be obtained through
/// [`WeightValue::ZERO`] or [`WeightValue::subtract`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct WeightValue(f64);

impl WeightValue {
    pub const ZERO: WeightValue = WeightValue(0.0);

    /// Validate a magnitude; accepts exactly `10.0..=500.0`
    pub fn new(value: f64) -> DomainResult<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(DomainError::WeightInvalid);
        }
        if value < MIN_WEIGHT_VALUE {
            return Err(DomainError::WeightTooLow);
        }
        if value > MAX_WEIGHT_VALUE {
            return Err(DomainError::WeightTooHigh);
        }
        Ok(Self(value))
    }

    pub fn as_f64(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// Difference between two values. Not validated: the result is a delta
    /// and may be negative or below the measurement floor.
    pub fn subtract(&self, other: WeightValue) -> WeightValue {
        WeightValue(self.0 - other.0)
    }

    /// Sum of two values, validated against the measurement bounds
    pub fn add(&self, other: WeightValue) -> DomainResult<WeightValue> {
        WeightValue::new(self.0 + other.0)
    }

    /// Absolute magnitude of a delta
    pub fn abs(&self) -> WeightValue {
        WeightValue(self.0.abs())
    }

    /// Express this magnitude, recorded in `from`, in another unit
    pub fn convert(&self, from: WeightUnit, to: WeightUnit) -> f64 {
        to.from_kg(from.to_kg(self.0))
    }
}

impl TryFrom<f64> for WeightValue {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WeightValue> for f64 {
    fn from(value: WeightValue) -> Self {
        value.0
    }
}

impl fmt::Display for WeightValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// A recorded weight measurement
#[derive(Debug, Clone, PartialEq)]
pub struct Weight {
    id: WeightId,
    user_id: UserId,
    value: WeightValue,
    unit: WeightUnit,
    measured_at: DateTime<Utc>,
    notes: String,
    created_at: DateTime<Utc>,
}

impl Weight {
    /// Create a new measurement.
    ///
    /// Measurements may be taken at any time up to the end of the current
    /// day; later timestamps are rejected.
    pub fn new(
        id: WeightId,
        user_id: UserId,
        value: WeightValue,
        unit: WeightUnit,
        measured_at: DateTime<Utc>,
        notes: impl Into<String>,
    ) -> DomainResult<Self> {
        if user_id.is_empty() {
            return Err(DomainError::EmptyUserId);
        }
        if value.is_zero() {
            return Err(DomainError::ZeroWeight);
        }

        let now = Utc::now();
        if measured_at > calendar::end_of_day(now) {
            return Err(DomainError::FutureMeasurement);
        }

        Ok(Self {
            id,
            user_id,
            value,
            unit,
            measured_at,
            notes: notes.into(),
            created_at: now,
        })
    }

    /// Rebuild a measurement loaded from storage without re-checking
    /// time-relative rules.
    pub fn reconstruct(
        id: WeightId,
        user_id: UserId,
        value: WeightValue,
        unit: WeightUnit,
        measured_at: DateTime<Utc>,
        notes: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            value,
            unit,
            measured_at,
            notes,
            created_at,
        }
    }

    pub fn id(&self) -> &WeightId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn value(&self) -> WeightValue {
        self.value
    }

    pub fn unit(&self) -> WeightUnit {
        self.unit
    }

    pub fn measured_at(&self) -> DateTime<Utc> {
        self.measured_at
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Measured within the last seven days
    pub fn is_recent(&self) -> bool {
        self.measured_at > Utc::now() - Duration::days(RECENT_WINDOW_DAYS)
    }

    pub fn is_same_day(&self, date: DateTime<Utc>) -> bool {
        self.measured_at.date_naive() == date.date_naive()
    }

    pub fn update_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn user() -> UserId {
        UserId::new("giada").unwrap()
    }

    fn kg(v: f64) -> WeightValue {
        WeightValue::new(v).unwrap()
    }

    fn measurement(id: &str, measured_at: DateTime<Utc>) -> DomainResult<Weight> {
        Weight::new(
            WeightId::new(id).unwrap(),
            user(),
            kg(70.5),
            WeightUnit::Kg,
            measured_at,
            "Morning weight",
        )
    }

    #[rstest]
    #[case(0.0, Err(DomainError::WeightInvalid))]
    #[case(-5.0, Err(DomainError::WeightInvalid))]
    #[case(9.99, Err(DomainError::WeightTooLow))]
    #[case(500.01, Err(DomainError::WeightTooHigh))]
    #[case(f64::NAN, Err(DomainError::WeightInvalid))]
    #[case(f64::INFINITY, Err(DomainError::WeightInvalid))]
    #[case(10.0, Ok(10.0))]
    #[case(70.5, Ok(70.5))]
    #[case(500.0, Ok(500.0))]
    fn test_weight_value_bounds(#[case] input: f64, #[case] expected: Result<f64, DomainError>) {
        assert_eq!(WeightValue::new(input).map(|w| w.as_f64()), expected);
    }

    #[rstest]
    #[case("-5.0")]
    #[case("0.0")]
    #[case("9.5")]
    #[case("9000.0")]
    fn test_deserialize_rejects_out_of_range(#[case] json: &str) {
        assert!(serde_json::from_str::<WeightValue>(json).is_err());
    }

    #[test]
    fn test_serde_round_trip_as_plain_number() {
        let value: WeightValue = serde_json::from_str("72.5").unwrap();
        assert_eq!(value, kg(72.5));
        assert_eq!(serde_json::to_string(&value).unwrap(), "72.5");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_weight_value_accepts_exactly_the_valid_range(v in -100.0f64..700.0) {
            let result = WeightValue::new(v);
            prop_assert_eq!(result.is_ok(), (MIN_WEIGHT_VALUE..=MAX_WEIGHT_VALUE).contains(&v));
        }

        #[test]
        fn prop_subtract_is_exact_delta(a in 10.0f64..500.0, b in 10.0f64..500.0) {
            let delta = kg(a).subtract(kg(b));
            prop_assert!((delta.as_f64() - (a - b)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_add_revalidates() {
        assert_eq!(kg(60.0).add(kg(20.0)).unwrap().as_f64(), 80.0);
        assert_eq!(kg(300.0).add(kg(250.0)), Err(DomainError::WeightTooHigh));
    }

    #[test]
    fn test_zero_sentinel() {
        assert!(WeightValue::ZERO.is_zero());
        assert!(WeightValue::default().is_zero());
        assert!(!kg(10.0).is_zero());
        assert!(kg(70.0).subtract(kg(70.0)).is_zero());
    }

    #[test]
    fn test_display_one_decimal() {
        assert_eq!(kg(70.54).to_string(), "70.5");
        assert_eq!(kg(72.0).to_string(), "72.0");
    }

    #[test]
    fn test_convert_between_units() {
        let lb = kg(100.0).convert(WeightUnit::Kg, WeightUnit::Lb);
        assert!((lb - 220.462).abs() < 0.01);
    }

    #[test]
    fn test_new_weight() {
        let measured_at = Utc::now() - Duration::days(1);
        let weight = measurement("weight_123", measured_at).unwrap();

        assert_eq!(weight.id().as_str(), "weight_123");
        assert_eq!(weight.user_id(), &user());
        assert_eq!(weight.value().as_f64(), 70.5);
        assert_eq!(weight.unit(), WeightUnit::Kg);
        assert_eq!(weight.measured_at(), measured_at);
        assert_eq!(weight.notes(), "Morning weight");
        assert!(weight.created_at() >= measured_at);
    }

    #[test]
    fn test_future_day_rejected() {
        let result = measurement("weight_126", Utc::now() + Duration::days(1) + Duration::hours(1));
        assert_eq!(result, Err(DomainError::FutureMeasurement));
    }

    #[test]
    fn test_later_today_allowed() {
        let now = Utc::now();
        let end = calendar::end_of_day(now);
        assert!(measurement("weight_200", end).is_ok());
    }

    #[test]
    fn test_zero_weight_rejected() {
        let result = Weight::new(
            WeightId::new("weight_127").unwrap(),
            user(),
            WeightValue::ZERO,
            WeightUnit::Kg,
            Utc::now(),
            "",
        );
        assert_eq!(result, Err(DomainError::ZeroWeight));
    }

    #[test]
    fn test_is_recent() {
        assert!(measurement("w1", Utc::now()).unwrap().is_recent());
        assert!(!measurement("w2", Utc::now() - Duration::days(14))
            .unwrap()
            .is_recent());
    }

    #[test]
    fn test_is_same_day() {
        let now = Utc::now();
        let weight = measurement("w1", now).unwrap();
        assert!(weight.is_same_day(now));
        assert!(!weight.is_same_day(now + Duration::days(1)));
    }

    #[test]
    fn test_update_notes() {
        let mut weight = measurement("w1", Utc::now() - Duration::days(1)).unwrap();
        weight.update_notes("Updated notes");
        assert_eq!(weight.notes(), "Updated notes");
    }

    #[test]
    fn test_reconstruct_keeps_stored_values() {
        let measured_at = Utc::now() + Duration::days(3);
        let created_at = Utc::now() - Duration::days(30);
        let weight = Weight::reconstruct(
            WeightId::new("w9").unwrap(),
            user(),
            kg(80.0),
            WeightUnit::Lb,
            measured_at,
            "imported".to_string(),
            created_at,
        );
        assert_eq!(weight.measured_at(), measured_at);
        assert_eq!(weight.created_at(), created_at);
        assert_eq!(weight.unit(), WeightUnit::Lb);
    }
}
