use crate::domain::StreakError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_TIMES_PER_WEEK: u8 = 1;
pub const MAX_TIMES_PER_WEEK: u8 = 7;

/// Number of logs a custom habit needs per calendar week (1..=7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeeklyTarget(u8);

impl WeeklyTarget {
    pub fn new(target: i64) -> Result<Self, StreakError> {
        if !(MIN_TIMES_PER_WEEK as i64..=MAX_TIMES_PER_WEEK as i64).contains(&target) {
            return Err(StreakError::invalid_policy(format!(
                "custom target must be between {} and {}, got {}",
                MIN_TIMES_PER_WEEK, MAX_TIMES_PER_WEEK, target
            )));
        }
        Ok(Self(target as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// How often a habit has to be logged to keep its streak.
///
/// `Daily` and `Weekly` are deliberately separate from `Custom(7)` and
/// `Custom(1)`: they tolerate breaks differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PolicyParts", into = "PolicyParts")]
pub enum FrequencyPolicy {
    Daily,
    Weekly,
    Custom(WeeklyTarget),
}

impl FrequencyPolicy {
    pub fn custom(target: i64) -> Result<Self, StreakError> {
        Ok(Self::Custom(WeeklyTarget::new(target)?))
    }

    /// Build a policy from its stored `(frequency_type, times_per_week)` pair.
    ///
    /// `times_per_week` is only meaningful for `custom`.
    pub fn from_parts(frequency_type: &str, times_per_week: i64) -> Result<Self, StreakError> {
        match frequency_type {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "custom" => Self::custom(times_per_week),
            other => Err(StreakError::invalid_policy(format!(
                "unknown frequency type {:?}",
                other
            ))),
        }
    }

    pub fn frequency_type(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Custom(_) => "custom",
        }
    }

    /// Logs required per week. Daily habits need all seven days.
    pub fn times_per_week(&self) -> u8 {
        match self {
            Self::Daily => MAX_TIMES_PER_WEEK,
            Self::Weekly => MIN_TIMES_PER_WEEK,
            Self::Custom(target) => target.get(),
        }
    }
}

impl fmt::Display for FrequencyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Custom(target) => write!(f, "{}x/week", target.get()),
        }
    }
}

/// Flat serialized form, matching the storage columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicyParts {
    frequency_type: String,
    times_per_week: i64,
}

impl TryFrom<PolicyParts> for FrequencyPolicy {
    type Error = StreakError;

    fn try_from(parts: PolicyParts) -> Result<Self, Self::Error> {
        Self::from_parts(&parts.frequency_type, parts.times_per_week)
    }
}

impl From<FrequencyPolicy> for PolicyParts {
    fn from(policy: FrequencyPolicy) -> Self {
        Self {
            frequency_type: policy.frequency_type().to_string(),
            times_per_week: policy.times_per_week() as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_builds_each_variant() {
        assert_eq!(FrequencyPolicy::from_parts("daily", 7).unwrap(), FrequencyPolicy::Daily);
        assert_eq!(FrequencyPolicy::from_parts("weekly", 1).unwrap(), FrequencyPolicy::Weekly);
        assert_eq!(
            FrequencyPolicy::from_parts("custom", 3).unwrap(),
            FrequencyPolicy::custom(3).unwrap()
        );
    }

    #[test]
    fn test_custom_target_bounds() {
        assert!(FrequencyPolicy::custom(1).is_ok());
        assert!(FrequencyPolicy::custom(7).is_ok());
        assert!(matches!(
            FrequencyPolicy::custom(0),
            Err(StreakError::InvalidPolicy { .. })
        ));
        assert!(matches!(
            FrequencyPolicy::custom(8),
            Err(StreakError::InvalidPolicy { .. })
        ));
        assert!(matches!(
            FrequencyPolicy::from_parts("custom", -1),
            Err(StreakError::InvalidPolicy { .. })
        ));
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let err = FrequencyPolicy::from_parts("monthly", 1).unwrap_err();
        assert!(err.to_string().contains("monthly"));
    }

    #[test]
    fn test_parts_round_trip_through_storage_columns() {
        for policy in [
            FrequencyPolicy::Daily,
            FrequencyPolicy::Weekly,
            FrequencyPolicy::custom(4).unwrap(),
        ] {
            let rebuilt =
                FrequencyPolicy::from_parts(policy.frequency_type(), policy.times_per_week() as i64)
                    .unwrap();
            assert_eq!(rebuilt, policy);
        }
    }

    #[test]
    fn test_serde_uses_flat_camel_case_shape() {
        let json = serde_json::to_string(&FrequencyPolicy::custom(3).unwrap()).unwrap();
        assert_eq!(json, r#"{"frequencyType":"custom","timesPerWeek":3}"#);

        let parsed: FrequencyPolicy =
            serde_json::from_str(r#"{"frequencyType":"weekly","timesPerWeek":1}"#).unwrap();
        assert_eq!(parsed, FrequencyPolicy::Weekly);

        assert!(
            serde_json::from_str::<FrequencyPolicy>(r#"{"frequencyType":"custom","timesPerWeek":9}"#)
                .is_err()
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(FrequencyPolicy::Daily.to_string(), "daily");
        assert_eq!(FrequencyPolicy::custom(5).unwrap().to_string(), "5x/week");
    }
}
