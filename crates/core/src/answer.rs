//! Answer grading: normalized string comparison per question kind.

use std::collections::HashSet;

use crate::model::{AnswerKey, Question};

/// Grade a learner's raw input against a question's answer key.
///
/// - Exact questions compare trimmed, case-insensitively.
/// - Multi-select questions take a comma-separated selection and accept it
///   only when the selected set matches the correct set exactly: no partial
///   credit, and any pick outside the correct set rejects the whole answer.
///   Repeated picks of the same option collapse; an empty selection never
///   validates.
#[must_use]
pub fn check_answer(question: &Question, user_answer: &str) -> bool {
    match question.answer() {
        AnswerKey::Exact(expected) => normalize(user_answer) == normalize(expected),
        AnswerKey::MultiSelect { correct, .. } => {
            let selected: HashSet<String> = user_answer
                .split(',')
                .map(normalize)
                .filter(|item| !item.is_empty())
                .collect();
            if selected.is_empty() {
                return false;
            }
            let expected: HashSet<String> = correct.iter().map(|s| normalize(s)).collect();
            selected == expected
        }
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}
