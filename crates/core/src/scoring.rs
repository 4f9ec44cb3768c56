use serde::Serialize;
use thiserror::Error;

use crate::model::SkillModule;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ScoreError {
    #[error("cannot score an empty session")]
    EmptySession,

    #[error("correct count ({correct}) exceeds total ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },

    #[error("pass threshold must be in (0, 1], got {provided}")]
    InvalidThreshold { provided: f64 },
}

//
// ─── TOKEN POLICY ──────────────────────────────────────────────────────────────
//

/// Per-module scoring rules: token rate, perfect-score bonus, and the pass
/// threshold for a single session.
///
/// Passing a session is necessary for progression but never sufficient for
/// mastery, which is decided from the completed-step set alone.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenPolicy {
    tokens_per_correct: u32,
    perfect_bonus: u32,
    pass_threshold: f64,
}

impl TokenPolicy {
    /// Build a custom policy.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::InvalidThreshold` when the threshold is outside
    /// `(0, 1]`.
    pub fn new(
        tokens_per_correct: u32,
        perfect_bonus: u32,
        pass_threshold: f64,
    ) -> Result<Self, ScoreError> {
        if !pass_threshold.is_finite() || pass_threshold <= 0.0 || pass_threshold > 1.0 {
            return Err(ScoreError::InvalidThreshold {
                provided: pass_threshold,
            });
        }
        Ok(Self {
            tokens_per_correct,
            perfect_bonus,
            pass_threshold,
        })
    }

    /// The configured policy for a module.
    ///
    /// Ratios and Fractions questions take longer to answer, so they pay a
    /// higher per-correct rate.
    #[must_use]
    pub fn for_module(module: SkillModule) -> Self {
        match module {
            SkillModule::MathFacts => Self {
                tokens_per_correct: 1,
                perfect_bonus: 5,
                pass_threshold: 0.8,
            },
            SkillModule::Ratios => Self {
                tokens_per_correct: 2,
                perfect_bonus: 5,
                pass_threshold: 0.8,
            },
            SkillModule::Fractions => Self {
                tokens_per_correct: 2,
                perfect_bonus: 5,
                pass_threshold: 0.8,
            },
            SkillModule::DecimalDefender => Self {
                tokens_per_correct: 1,
                perfect_bonus: 5,
                pass_threshold: 0.8,
            },
        }
    }

    #[must_use]
    pub fn tokens_per_correct(&self) -> u32 {
        self.tokens_per_correct
    }

    #[must_use]
    pub fn perfect_bonus(&self) -> u32 {
        self.perfect_bonus
    }

    #[must_use]
    pub fn pass_threshold(&self) -> f64 {
        self.pass_threshold
    }
}

//
// ─── SCORING ───────────────────────────────────────────────────────────────────
//

/// Scored outcome of a single session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionScore {
    pub percentage: f64,
    pub passed: bool,
    pub tokens_earned: u32,
}

/// Score a finished session under a module's token policy.
///
/// Tokens are `correct * tokens_per_correct`, plus the flat bonus only when
/// every single question was answered correctly — a 99% session earns no
/// bonus.
///
/// # Errors
///
/// Returns `ScoreError::EmptySession` when `total` is zero and
/// `ScoreError::CorrectExceedsTotal` when the counts are inconsistent.
pub fn score_session(
    correct: u32,
    total: u32,
    policy: &TokenPolicy,
) -> Result<SessionScore, ScoreError> {
    if total == 0 {
        return Err(ScoreError::EmptySession);
    }
    if correct > total {
        return Err(ScoreError::CorrectExceedsTotal { correct, total });
    }

    let percentage = f64::from(correct) / f64::from(total);
    let passed = percentage >= policy.pass_threshold;

    let mut tokens_earned = correct.saturating_mul(policy.tokens_per_correct);
    if correct == total {
        tokens_earned = tokens_earned.saturating_add(policy.perfect_bonus);
    }

    Ok(SessionScore {
        percentage,
        passed,
        tokens_earned,
    })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
