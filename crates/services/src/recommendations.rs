//! Next-step recommendations per operator.

use serde::Serialize;

use math_core::model::{Operator, UserProgress};
use math_core::progression::{is_progression_complete, next_step};

/// What a learner should practice next for one operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub operator: Operator,
    pub level: u8,
    pub next_step: Option<&'static str>,
    pub mastered: bool,
}

/// Build one recommendation per operator from a learner's progress.
///
/// The same grade-gated step filter drives both fields, so `next_step` is
/// `None` exactly when `mastered` is true.
#[must_use]
pub fn recommend(progress: &UserProgress) -> Vec<Recommendation> {
    Operator::ALL
        .iter()
        .map(|&operator| {
            let completed = progress.completed_types(operator);
            let grade = progress.grade();
            Recommendation {
                operator,
                level: progress.level(operator),
                next_step: next_step(operator, &completed, grade),
                mastered: is_progression_complete(operator, &completed, grade),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use math_core::model::{Grade, UserId};
    use math_core::progression::required_steps;

    #[test]
    fn a_fresh_learner_starts_every_operator_at_the_first_step() {
        let progress = UserProgress::new(UserId::new(1), Grade::Second);
        let recs = recommend(&progress);

        assert_eq!(recs.len(), 4);
        for rec in &recs {
            assert_eq!(rec.level, 1);
            assert!(!rec.mastered);
            assert_eq!(
                rec.next_step,
                Some(required_steps(rec.operator, Grade::Second)[0])
            );
        }
    }

    #[test]
    fn next_step_advances_as_steps_complete() {
        let mut progress = UserProgress::new(UserId::new(1), Grade::Third);
        progress.complete_step(Operator::Addition, "Adding 0 and 1");

        let recs = recommend(&progress);
        let addition = recs
            .iter()
            .find(|r| r.operator == Operator::Addition)
            .unwrap();
        assert_eq!(addition.next_step, Some("Adding 2"));
    }

    #[test]
    fn a_mastered_operator_has_no_next_step() {
        let mut progress = UserProgress::new(UserId::new(1), Grade::Sixth);
        for step in required_steps(Operator::Multiplication, Grade::Sixth) {
            progress.complete_step(Operator::Multiplication, step);
        }

        let recs = recommend(&progress);
        let multiplication = recs
            .iter()
            .find(|r| r.operator == Operator::Multiplication)
            .unwrap();
        assert!(multiplication.mastered);
        assert_eq!(multiplication.next_step, None);

        let division = recs
            .iter()
            .find(|r| r.operator == Operator::Division)
            .unwrap();
        assert!(!division.mastered);
    }
}
