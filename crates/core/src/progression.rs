//! Per-operator progression curricula and the mastery evaluator.
//!
//! Each operator carries an ordered list of named sub-skills. A learner has
//! mastered an operator once every step required at their grade is in their
//! completed set — session scores are deliberately not part of the decision,
//! so a lucky high score can never grant mastery early.
//!
//! Grade gating is declarative: a step tagged with `skip_from` stops being
//! required once the learner's grade reaches that bound, and the same filter
//! feeds mastery checking and next-step recommendation.

use std::collections::HashSet;

use crate::model::{Grade, Operator};

//
// ─── STEP TABLES ───────────────────────────────────────────────────────────────
//

/// One named sub-skill in an operator's ordered curriculum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressionStep {
    name: &'static str,
    skip_from: Option<Grade>,
}

impl ProgressionStep {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this step counts toward mastery at the given grade.
    #[must_use]
    pub fn required_for(&self, grade: Grade) -> bool {
        match self.skip_from {
            Some(bound) => grade < bound,
            None => true,
        }
    }
}

const fn step(name: &'static str) -> ProgressionStep {
    ProgressionStep {
        name,
        skip_from: None,
    }
}

const fn step_until(name: &'static str, bound: Grade) -> ProgressionStep {
    ProgressionStep {
        name,
        skip_from: Some(bound),
    }
}

const ADDITION_STEPS: &[ProgressionStep] = &[
    step("Adding 0 and 1"),
    step("Adding 2"),
    step("Doubles to 10"),
    step("Doubles to 20"),
    step("Making 10"),
    step("Adding 10s"),
    step("Near Doubles"),
    step("Sums to 20"),
];

const SUBTRACTION_STEPS: &[ProgressionStep] = &[
    step("Subtracting 0 and 1"),
    step("Subtracting 2"),
    step("Halving Doubles"),
    step("Taking from 10"),
    step("Subtracting 10s"),
    step("Fact Families"),
    step("Differences to 20"),
];

const MULTIPLICATION_STEPS: &[ProgressionStep] = &[
    step_until("Multiplying by 0 and 1", Grade::Sixth),
    step("Multiplying by 2"),
    step("Multiplying by 5 and 10"),
    step_until("Squares", Grade::Sixth),
    step("Multiplying by 3 and 4"),
    step("Multiplying by 6 and 7"),
    step("Multiplying by 8 and 9"),
];

const DIVISION_STEPS: &[ProgressionStep] = &[
    step_until("Dividing by 1", Grade::Sixth),
    step("Dividing by 2"),
    step("Dividing by 5 and 10"),
    step_until("Dividing Squares", Grade::Sixth),
    step("Dividing by 3 and 4"),
    step("Dividing by 6 and 7"),
    step("Dividing by 8 and 9"),
];

/// The full ordered curriculum for an operator, before grade filtering.
#[must_use]
pub fn steps_for(operator: Operator) -> &'static [ProgressionStep] {
    match operator {
        Operator::Addition => ADDITION_STEPS,
        Operator::Subtraction => SUBTRACTION_STEPS,
        Operator::Multiplication => MULTIPLICATION_STEPS,
        Operator::Division => DIVISION_STEPS,
    }
}

//
// ─── EVALUATOR ─────────────────────────────────────────────────────────────────
//

/// Step names required for mastery at the given grade, in curriculum order.
#[must_use]
pub fn required_steps(operator: Operator, grade: Grade) -> Vec<&'static str> {
    steps_for(operator)
        .iter()
        .filter(|s| s.required_for(grade))
        .map(ProgressionStep::name)
        .collect()
}

/// True iff every step required at this grade appears in `completed_types`.
///
/// Completeness is the whole decision: the evaluator never looks at scores,
/// and an empty completed set is always incomplete because every operator
/// keeps at least one required step at every grade.
#[must_use]
pub fn is_progression_complete(
    operator: Operator,
    completed_types: &HashSet<String>,
    grade: Grade,
) -> bool {
    steps_for(operator)
        .iter()
        .filter(|s| s.required_for(grade))
        .all(|s| completed_types.contains(s.name))
}

/// First required step not yet completed, in curriculum order.
///
/// `None` means the progression is complete for this grade.
#[must_use]
pub fn next_step(
    operator: Operator,
    completed_types: &HashSet<String>,
    grade: Grade,
) -> Option<&'static str> {
    steps_for(operator)
        .iter()
        .filter(|s| s.required_for(grade))
        .map(ProgressionStep::name)
        .find(|name| !completed_types.contains(*name))
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(names: &[&str]) -> HashSet<String> {
        names.iter().map(ToString::to_string).collect()
    }

    fn complete_all(operator: Operator, grade: Grade) -> HashSet<String> {
        required_steps(operator, grade)
            .into_iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn empty_completed_set_is_never_complete() {
        for operator in Operator::ALL {
            for grade in Grade::ALL {
                assert!(
                    !is_progression_complete(operator, &HashSet::new(), grade),
                    "{operator} at grade {grade} complete with nothing done"
                );
            }
        }
    }

    #[test]
    fn any_missing_required_step_blocks_completion() {
        for operator in Operator::ALL {
            for grade in Grade::ALL {
                let all = required_steps(operator, grade);
                for missing in &all {
                    let mut set = complete_all(operator, grade);
                    set.remove(*missing);
                    assert!(
                        !is_progression_complete(operator, &set, grade),
                        "{operator} at grade {grade} complete without {missing:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn completing_every_required_step_completes_the_progression() {
        for operator in Operator::ALL {
            for grade in Grade::ALL {
                let set = complete_all(operator, grade);
                assert!(is_progression_complete(operator, &set, grade));
            }
        }
    }

    #[test]
    fn two_of_twelve_steps_is_incomplete_whatever_the_score() {
        // addition, grade 3: a 90% session with only two steps done stays
        // unmastered because score is not an input at all
        let set = completed(&["Adding 0 and 1", "Adding 2"]);
        assert!(!is_progression_complete(Operator::Addition, &set, Grade::Third));
    }

    #[test]
    fn grade_six_skips_trivial_multiplication_steps() {
        let required = required_steps(Operator::Multiplication, Grade::Sixth);
        assert!(!required.contains(&"Multiplying by 0 and 1"));
        assert!(!required.contains(&"Squares"));

        // completing only the remaining steps is mastery at grade 6...
        let set = complete_all(Operator::Multiplication, Grade::Sixth);
        assert!(is_progression_complete(Operator::Multiplication, &set, Grade::Sixth));
        // ...but not at grade 5, where the skipped steps still count
        assert!(!is_progression_complete(Operator::Multiplication, &set, Grade::Fifth));
    }

    #[test]
    fn grade_six_plus_skips_the_same_division_steps() {
        let required = required_steps(Operator::Division, Grade::SixPlus);
        assert!(!required.contains(&"Dividing by 1"));
        assert!(!required.contains(&"Dividing Squares"));
        assert!(required.contains(&"Dividing by 8 and 9"));
    }

    #[test]
    fn every_operator_keeps_required_steps_at_every_grade() {
        for operator in Operator::ALL {
            for grade in Grade::ALL {
                assert!(
                    !required_steps(operator, grade).is_empty(),
                    "{operator} has no required steps at grade {grade}"
                );
            }
        }
    }

    #[test]
    fn next_step_walks_the_curriculum_in_order() {
        let mut set = HashSet::new();
        assert_eq!(
            next_step(Operator::Addition, &set, Grade::Second),
            Some("Adding 0 and 1")
        );

        set.insert("Adding 0 and 1".to_string());
        assert_eq!(
            next_step(Operator::Addition, &set, Grade::Second),
            Some("Adding 2")
        );

        let done = complete_all(Operator::Addition, Grade::Second);
        assert_eq!(next_step(Operator::Addition, &done, Grade::Second), None);
    }

    #[test]
    fn next_step_ignores_steps_skipped_at_grade() {
        let set = HashSet::new();
        assert_eq!(
            next_step(Operator::Multiplication, &set, Grade::Sixth),
            Some("Multiplying by 2")
        );
    }
}
