use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::SkillModule;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionResultError {
    #[error("a session must contain at least one question")]
    EmptySession,

    #[error("correct count ({correct}) exceeds total ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },
}

/// Outcome of one finished practice session.
///
/// Created at session end, consumed by bookkeeping and the session log, then
/// discarded — it has no long-term identity of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResult {
    module: SkillModule,
    correct: u32,
    total: u32,
    duration_secs: u32,
    tokens_earned: u32,
    completed_at: DateTime<Utc>,
}

impl SessionResult {
    /// Build a validated session result.
    ///
    /// # Errors
    ///
    /// Returns `SessionResultError::EmptySession` when `total` is zero, or
    /// `SessionResultError::CorrectExceedsTotal` when the counts are
    /// inconsistent.
    pub fn new(
        module: SkillModule,
        correct: u32,
        total: u32,
        duration_secs: u32,
        tokens_earned: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, SessionResultError> {
        if total == 0 {
            return Err(SessionResultError::EmptySession);
        }
        if correct > total {
            return Err(SessionResultError::CorrectExceedsTotal { correct, total });
        }

        Ok(Self {
            module,
            correct,
            total,
            duration_secs,
            tokens_earned,
            completed_at,
        })
    }

    #[must_use]
    pub fn module(&self) -> SkillModule {
        self.module
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    #[must_use]
    pub fn tokens_earned(&self) -> u32 {
        self.tokens_earned
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Fraction of questions answered correctly, in `[0.0, 1.0]`.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        f64::from(self.correct) / f64::from(self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn result_validates_counts() {
        let err = SessionResult::new(SkillModule::Ratios, 0, 0, 60, 0, fixed_now()).unwrap_err();
        assert_eq!(err, SessionResultError::EmptySession);

        let err =
            SessionResult::new(SkillModule::Ratios, 13, 12, 60, 0, fixed_now()).unwrap_err();
        assert_eq!(
            err,
            SessionResultError::CorrectExceedsTotal {
                correct: 13,
                total: 12
            }
        );
    }

    #[test]
    fn percentage_is_correct_over_total() {
        let result =
            SessionResult::new(SkillModule::MathFacts, 9, 12, 300, 9, fixed_now()).unwrap();
        assert!((result.percentage() - 0.75).abs() < f64::EPSILON);
    }
}
