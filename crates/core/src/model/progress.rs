use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use crate::model::{Grade, Operator, UserId};
use crate::progression::is_progression_complete;

/// Highest difficulty level any module's rule tables are configured for.
pub const MAX_LEVEL: u8 = 5;

/// Consecutive passed sessions needed to move an operator up one level.
const LEVEL_UP_STREAK: u32 = 3;
/// Consecutive failed sessions that move an operator down one level.
const LEVEL_DOWN_STREAK: u32 = 2;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("level must be in 1..={MAX_LEVEL}, got {provided}")]
    InvalidLevel { provided: u8 },

    #[error("duplicate progress rows for operator {operator}")]
    DuplicateOperator { operator: Operator },
}

//
// ─── PER-OPERATOR PROGRESS ─────────────────────────────────────────────────────
//

/// Mutable practice state for one operator: difficulty level, pass/fail
/// streak counters, and the set of completed progression steps.
///
/// The streak counters move only the difficulty level. Mastery is decided
/// elsewhere, from the completed-step set alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorProgress {
    level: u8,
    attempt_good: u32,
    attempt_bad: u32,
    completed_types: HashSet<String>,
}

impl Default for OperatorProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl OperatorProgress {
    /// Fresh progress at level 1 with nothing completed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            level: 1,
            attempt_good: 0,
            attempt_bad: 0,
            completed_types: HashSet::new(),
        }
    }

    /// Rehydrate from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidLevel` when the level is outside
    /// `1..=MAX_LEVEL`.
    pub fn from_persisted(
        level: u8,
        attempt_good: u32,
        attempt_bad: u32,
        completed_types: HashSet<String>,
    ) -> Result<Self, ProgressError> {
        if level == 0 || level > MAX_LEVEL {
            return Err(ProgressError::InvalidLevel { provided: level });
        }
        Ok(Self {
            level,
            attempt_good,
            attempt_bad,
            completed_types,
        })
    }

    #[must_use]
    pub fn level(&self) -> u8 {
        self.level
    }

    #[must_use]
    pub fn attempt_good(&self) -> u32 {
        self.attempt_good
    }

    #[must_use]
    pub fn attempt_bad(&self) -> u32 {
        self.attempt_bad
    }

    #[must_use]
    pub fn completed_types(&self) -> &HashSet<String> {
        &self.completed_types
    }

    /// Record a step as completed. Idempotent.
    pub fn complete_step(&mut self, step: &str) {
        self.completed_types.insert(step.to_string());
    }

    /// Record the outcome of a scored session and apply streak-based level
    /// movement: `LEVEL_UP_STREAK` consecutive passes move up one level,
    /// `LEVEL_DOWN_STREAK` consecutive fails move down one. Any movement
    /// resets both counters; the level stays within `1..=MAX_LEVEL`.
    pub fn record_attempt(&mut self, passed: bool) {
        if passed {
            self.attempt_good += 1;
            self.attempt_bad = 0;
            if self.attempt_good >= LEVEL_UP_STREAK {
                self.level = (self.level + 1).min(MAX_LEVEL);
                self.attempt_good = 0;
            }
        } else {
            self.attempt_bad += 1;
            self.attempt_good = 0;
            if self.attempt_bad >= LEVEL_DOWN_STREAK {
                self.level = self.level.saturating_sub(1).max(1);
                self.attempt_bad = 0;
            }
        }
    }
}

//
// ─── USER PROGRESS ─────────────────────────────────────────────────────────────
//

/// Aggregate persisted state for one learner: grade, token balance, and
/// per-operator practice state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProgress {
    user_id: UserId,
    grade: Grade,
    tokens: u32,
    by_operator: BTreeMap<Operator, OperatorProgress>,
}

impl UserProgress {
    /// Fresh progress record for a new learner.
    #[must_use]
    pub fn new(user_id: UserId, grade: Grade) -> Self {
        Self {
            user_id,
            grade,
            tokens: 0,
            by_operator: BTreeMap::new(),
        }
    }

    /// Rehydrate from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::DuplicateOperator` when the same operator
    /// appears twice, or `ProgressError::InvalidLevel` from a bad row.
    pub fn from_persisted(
        user_id: UserId,
        grade: Grade,
        tokens: u32,
        operators: Vec<(Operator, OperatorProgress)>,
    ) -> Result<Self, ProgressError> {
        let mut by_operator = BTreeMap::new();
        for (operator, progress) in operators {
            if by_operator.insert(operator, progress).is_some() {
                return Err(ProgressError::DuplicateOperator { operator });
            }
        }
        Ok(Self {
            user_id,
            grade,
            tokens,
            by_operator,
        })
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn grade(&self) -> Grade {
        self.grade
    }

    #[must_use]
    pub fn tokens(&self) -> u32 {
        self.tokens
    }

    #[must_use]
    pub fn operator(&self, operator: Operator) -> Option<&OperatorProgress> {
        self.by_operator.get(&operator)
    }

    /// Iterate over the operators this learner has touched.
    pub fn operators(&self) -> impl Iterator<Item = (Operator, &OperatorProgress)> {
        self.by_operator.iter().map(|(op, p)| (*op, p))
    }

    /// Current difficulty level for an operator (1 when never practiced).
    #[must_use]
    pub fn level(&self, operator: Operator) -> u8 {
        self.by_operator.get(&operator).map_or(1, OperatorProgress::level)
    }

    /// Completed step names for an operator (empty when never practiced).
    #[must_use]
    pub fn completed_types(&self, operator: Operator) -> HashSet<String> {
        self.by_operator
            .get(&operator)
            .map(|p| p.completed_types.clone())
            .unwrap_or_default()
    }

    pub fn complete_step(&mut self, operator: Operator, step: &str) {
        self.by_operator.entry(operator).or_default().complete_step(step);
    }

    pub fn record_attempt(&mut self, operator: Operator, passed: bool) {
        self.by_operator
            .entry(operator)
            .or_default()
            .record_attempt(passed);
    }

    pub fn add_tokens(&mut self, amount: u32) {
        self.tokens = self.tokens.saturating_add(amount);
    }

    /// Overwrite the token balance with an authoritative value.
    pub fn set_tokens(&mut self, balance: u32) {
        self.tokens = balance;
    }

    /// Mastery check: every progression step required at this learner's grade
    /// is completed. Score never enters the decision.
    #[must_use]
    pub fn is_operator_mastered(&self, operator: Operator) -> bool {
        match self.by_operator.get(&operator) {
            Some(progress) => {
                is_progression_complete(operator, &progress.completed_types, self.grade)
            }
            // no required step is ever completed for an untouched operator
            None => false,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::required_steps;

    fn progress() -> UserProgress {
        UserProgress::new(UserId::new(7), Grade::Third)
    }

    #[test]
    fn fresh_progress_starts_at_level_one_with_no_tokens() {
        let p = progress();
        assert_eq!(p.tokens(), 0);
        assert_eq!(p.level(Operator::Addition), 1);
        assert!(p.completed_types(Operator::Addition).is_empty());
    }

    #[test]
    fn complete_step_is_idempotent() {
        let mut p = progress();
        p.complete_step(Operator::Addition, "Adding 0 and 1");
        p.complete_step(Operator::Addition, "Adding 0 and 1");
        assert_eq!(p.completed_types(Operator::Addition).len(), 1);
    }

    #[test]
    fn three_consecutive_passes_level_up_and_reset_streak() {
        let mut p = progress();
        for _ in 0..3 {
            p.record_attempt(Operator::Multiplication, true);
        }
        assert_eq!(p.level(Operator::Multiplication), 2);
        assert_eq!(p.operator(Operator::Multiplication).unwrap().attempt_good(), 0);
    }

    #[test]
    fn a_fail_breaks_the_pass_streak() {
        let mut p = progress();
        p.record_attempt(Operator::Addition, true);
        p.record_attempt(Operator::Addition, true);
        p.record_attempt(Operator::Addition, false);
        p.record_attempt(Operator::Addition, true);
        assert_eq!(p.level(Operator::Addition), 1);
    }

    #[test]
    fn two_consecutive_fails_level_down_with_a_floor_of_one() {
        let mut p = progress();
        p.record_attempt(Operator::Division, false);
        p.record_attempt(Operator::Division, false);
        assert_eq!(p.level(Operator::Division), 1);

        for _ in 0..3 {
            p.record_attempt(Operator::Division, true);
        }
        assert_eq!(p.level(Operator::Division), 2);
        p.record_attempt(Operator::Division, false);
        p.record_attempt(Operator::Division, false);
        assert_eq!(p.level(Operator::Division), 1);
    }

    #[test]
    fn level_is_capped_at_max() {
        let mut p = progress();
        for _ in 0..(3 * (u32::from(MAX_LEVEL) + 2)) {
            p.record_attempt(Operator::Addition, true);
        }
        assert_eq!(p.level(Operator::Addition), MAX_LEVEL);
    }

    #[test]
    fn tokens_saturate_instead_of_overflowing() {
        let mut p = progress();
        p.add_tokens(u32::MAX);
        p.add_tokens(10);
        assert_eq!(p.tokens(), u32::MAX);
    }

    #[test]
    fn mastery_requires_every_required_step() {
        let mut p = progress();
        assert!(!p.is_operator_mastered(Operator::Addition));

        let steps = required_steps(Operator::Addition, Grade::Third);
        for step in &steps[..steps.len() - 1] {
            p.complete_step(Operator::Addition, step);
        }
        assert!(!p.is_operator_mastered(Operator::Addition));

        p.complete_step(Operator::Addition, steps[steps.len() - 1]);
        assert!(p.is_operator_mastered(Operator::Addition));
    }

    #[test]
    fn from_persisted_rejects_bad_rows() {
        let err = OperatorProgress::from_persisted(0, 0, 0, HashSet::new()).unwrap_err();
        assert_eq!(err, ProgressError::InvalidLevel { provided: 0 });

        let err = UserProgress::from_persisted(
            UserId::new(1),
            Grade::K,
            0,
            vec![
                (Operator::Addition, OperatorProgress::new()),
                (Operator::Addition, OperatorProgress::new()),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ProgressError::DuplicateOperator {
                operator: Operator::Addition
            }
        );
    }
}
