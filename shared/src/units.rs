//! Weight units
//!
//! Measurements are stored with the unit they were entered in. Conversion
//! helpers exist for display; business rules compare raw magnitudes.

use crate::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kilograms per pound
pub const KG_PER_LB: f64 = 0.453592;

/// Unit a weight was recorded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

impl WeightUnit {
    /// Parse a unit, accepting only the canonical `kg` and `lb` spellings
    pub fn new(value: &str) -> Result<Self, DomainError> {
        value.parse()
    }

    /// Convert from this unit to kilograms
    pub fn to_kg(&self, value: f64) -> f64 {
        match self {
            WeightUnit::Kg => value,
            WeightUnit::Lb => value * KG_PER_LB,
        }
    }

    /// Convert from kilograms to this unit
    pub fn from_kg(&self, kg: f64) -> f64 {
        match self {
            WeightUnit::Kg => kg,
            WeightUnit::Lb => kg / KG_PER_LB,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lb => "lb",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightUnit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kg" => Ok(WeightUnit::Kg),
            "lb" => Ok(WeightUnit::Lb),
            other => Err(DomainError::InvalidWeightUnit(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("kg", WeightUnit::Kg)]
    #[case("lb", WeightUnit::Lb)]
    fn test_valid_units(#[case] input: &str, #[case] expected: WeightUnit) {
        assert_eq!(WeightUnit::new(input).unwrap(), expected);
        assert_eq!(expected.to_string(), input);
    }

    #[rstest]
    #[case("")]
    #[case("invalid")]
    #[case("KG")]
    #[case("lbs")]
    #[case("stone")]
    fn test_invalid_units_rejected(#[case] input: &str) {
        assert_eq!(
            WeightUnit::new(input),
            Err(DomainError::InvalidWeightUnit(input.to_string()))
        );
    }

    #[test]
    fn test_pound_conversion() {
        let kg = WeightUnit::Lb.to_kg(100.0);
        assert!((kg - 45.3592).abs() < 1e-9);
        assert!((WeightUnit::Lb.from_kg(kg) - 100.0).abs() < 1e-9);
        assert_eq!(WeightUnit::Kg.to_kg(70.0), 70.0);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&WeightUnit::Lb).unwrap(), "\"lb\"");
        let unit: WeightUnit = serde_json::from_str("\"kg\"").unwrap();
        assert_eq!(unit, WeightUnit::Kg);
    }
}
