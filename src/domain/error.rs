/// Caller-input errors raised by the streak engine.
///
/// Neither variant is transient. A malformed date or policy is reported
/// instead of being folded into a streak of 0, which would be
/// indistinguishable from a habit that simply has no streak.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreakError {
    #[error("Invalid date format: {input:?} (expected YYYY-MM-DD)")]
    InvalidDateFormat { input: String },

    #[error("Invalid frequency policy: {reason}")]
    InvalidPolicy { reason: String },
}

impl StreakError {
    pub fn invalid_date(input: impl Into<String>) -> Self {
        Self::InvalidDateFormat {
            input: input.into(),
        }
    }

    pub fn invalid_policy(reason: impl Into<String>) -> Self {
        Self::InvalidPolicy {
            reason: reason.into(),
        }
    }
}
