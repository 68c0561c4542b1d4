//! Identifier value objects
//!
//! Identifiers are trimmed, non-empty strings compared by value. Entities
//! reference each other only through these.

use crate::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const MAX_USER_ID_LENGTH: usize = 50;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<&str> for $name {
            type Error = DomainError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<String> for $name {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(&value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

string_id!(
    /// Identifier of a user account
    UserId
);

string_id!(
    /// Identifier of a weight measurement
    WeightId
);

string_id!(
    /// Identifier of a goal
    GoalId
);

impl UserId {
    /// Create a user ID, rejecting blank values and values over 50 characters
    pub fn new(value: &str) -> Result<Self, DomainError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyUserId);
        }
        if trimmed.chars().count() > MAX_USER_ID_LENGTH {
            return Err(DomainError::UserIdTooLong);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Fresh random identifier for a newly registered user
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl WeightId {
    pub fn new(value: &str) -> Result<Self, DomainError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyWeightId);
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl GoalId {
    pub fn new(value: &str) -> Result<Self, DomainError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyGoalId);
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// Identifier of a login session, always a UUID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a stored session ID
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptySessionId);
        }
        Uuid::parse_str(trimmed)
            .map(Self)
            .map_err(|_| DomainError::InvalidSessionId)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for SessionId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("giada", Ok("giada"))]
    #[case("  emilio  ", Ok("emilio"))]
    #[case("", Err(DomainError::EmptyUserId))]
    #[case("   ", Err(DomainError::EmptyUserId))]
    #[case(
        "abcdefghijklmnopqrstuvwxyzabcdefghijklmnopqrstuvwxyz",
        Err(DomainError::UserIdTooLong)
    )]
    fn test_user_id(#[case] input: &str, #[case] expected: Result<&str, DomainError>) {
        let result = UserId::new(input);
        assert_eq!(result.as_ref().map(|id| id.as_str()), expected.as_deref());
    }

    #[test]
    fn test_user_id_length_limit_is_inclusive() {
        let fifty = "a".repeat(50);
        assert!(UserId::new(&fifty).is_ok());
        assert_eq!(UserId::new(&"a".repeat(51)), Err(DomainError::UserIdTooLong));
    }

    #[test]
    fn test_ids_compare_by_trimmed_value() {
        assert_eq!(UserId::new(" giada").unwrap(), UserId::new("giada ").unwrap());
        assert_eq!(WeightId::new(" w1 ").unwrap().as_str(), "w1");
        assert_eq!(GoalId::new("g1").unwrap(), GoalId::new(" g1").unwrap());
    }

    #[rstest]
    #[case("")]
    #[case("  \t ")]
    fn test_blank_weight_and_goal_ids_rejected(#[case] input: &str) {
        assert_eq!(WeightId::new(input), Err(DomainError::EmptyWeightId));
        assert_eq!(GoalId::new(input), Err(DomainError::EmptyGoalId));
    }

    #[test]
    fn test_deserialize_validates() {
        let id: UserId = serde_json::from_str("\" giada \"").unwrap();
        assert_eq!(id.as_str(), "giada");
        assert!(serde_json::from_str::<UserId>("\"\"").is_err());
        assert!(serde_json::from_str::<WeightId>("\"  \"").is_err());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"giada\"");
    }

    #[test]
    fn test_session_id_parse() {
        let id = SessionId::generate();
        assert_eq!(SessionId::parse(&id.to_string()).unwrap(), id);
        assert_eq!(SessionId::parse(" "), Err(DomainError::EmptySessionId));
        assert_eq!(SessionId::parse("not-a-uuid"), Err(DomainError::InvalidSessionId));
    }

    #[test]
    fn test_generated_user_ids_are_valid() {
        let id = UserId::generate();
        assert!(UserId::new(id.as_str()).is_ok());
    }
}
