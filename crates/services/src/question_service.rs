//! Duplicate-avoidance layer over the question generators.
//!
//! `SeenQuestions` is explicit, passed-in state with a per-session lifetime
//! rather than a module-level cache, so callers own exactly how long an
//! exclusion set lives. Serving retries generation a bounded number of times
//! on a fingerprint collision and then accepts a possible repeat; exhausting
//! the bound is a degraded outcome, not an error.

use std::collections::BTreeSet;

use rand::Rng;

use math_core::model::{Question, SkillModule};

use crate::generator::{self, GeneratorError};

/// How many regenerations a collision is allowed before a repeat is served.
pub const DUPLICATE_RETRY_LIMIT: usize = 5;

//
// ─── SEEN QUESTIONS ────────────────────────────────────────────────────────────
//

/// Fingerprints of recently served questions.
///
/// Keys are `Question::fingerprint` values, not transport ids: every serving
/// mints a fresh `QuestionId`, so the random id would never collide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenQuestions {
    fingerprints: BTreeSet<String>,
}

impl SeenQuestions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a served fingerprint. Returns false if it was already known.
    pub fn insert(&mut self, fingerprint: impl Into<String>) -> bool {
        self.fingerprints.insert(fingerprint.into())
    }

    #[must_use]
    pub fn contains(&self, fingerprint: &str) -> bool {
        self.fingerprints.contains(fingerprint)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    /// Encode as the `exclude` query-parameter value.
    #[must_use]
    pub fn to_param(&self) -> String {
        self.fingerprints
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Decode from the `exclude` query-parameter value. Blank items are
    /// dropped, so a missing or empty parameter yields an empty set.
    #[must_use]
    pub fn from_param(param: &str) -> Self {
        Self {
            fingerprints: param
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(ToString::to_string)
                .collect(),
        }
    }
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Serves freshly generated questions while steering around an exclusion set.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuestionService;

impl QuestionService {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Generate a question whose fingerprint is not in `seen`, retrying up to
    /// `DUPLICATE_RETRY_LIMIT` times on collision. When the bound is
    /// exhausted the last candidate is served even though it is a repeat.
    ///
    /// # Errors
    ///
    /// Propagates `GeneratorError` (unknown skill, misconfigured level).
    pub fn next_question<R: Rng>(
        &self,
        module: SkillModule,
        skill: &str,
        level: u8,
        seen: &SeenQuestions,
        rng: &mut R,
    ) -> Result<Question, GeneratorError> {
        let mut question = generator::generate(module, skill, level, rng)?;
        for _ in 0..DUPLICATE_RETRY_LIMIT {
            if !seen.contains(&question.fingerprint()) {
                break;
            }
            question = generator::generate(module, skill, level, rng)?;
        }
        Ok(question)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn serves_an_unseen_question_immediately() {
        let service = QuestionService::new();
        let seen = SeenQuestions::new();
        let mut rng = StdRng::seed_from_u64(40);

        let question = service
            .next_question(SkillModule::MathFacts, "addition", 1, &seen, &mut rng)
            .unwrap();
        assert!(!seen.contains(&question.fingerprint()));
    }

    #[test]
    fn steers_around_a_seen_fingerprint() {
        let service = QuestionService::new();
        let mut rng = StdRng::seed_from_u64(41);

        // The clone replays the exact draw the service will make first.
        let mut preview = rng.clone();
        let first = generator::generate(SkillModule::MathFacts, "addition", 3, &mut preview)
            .unwrap();

        let mut seen = SeenQuestions::new();
        seen.insert(first.fingerprint());

        let served = service
            .next_question(SkillModule::MathFacts, "addition", 3, &seen, &mut rng)
            .unwrap();
        assert_ne!(served.fingerprint(), first.fingerprint());
    }

    #[test]
    fn accepts_a_repeat_once_the_retry_bound_is_exhausted() {
        let service = QuestionService::new();
        let mut rng = StdRng::seed_from_u64(42);

        // Pre-play every draw the service can make (first try plus retries)
        // and mark them all as seen, forcing exhaustion.
        let mut preview = rng.clone();
        let mut seen = SeenQuestions::new();
        for _ in 0..=DUPLICATE_RETRY_LIMIT {
            let q = generator::generate(SkillModule::MathFacts, "addition", 3, &mut preview)
                .unwrap();
            seen.insert(q.fingerprint());
        }

        let served = service
            .next_question(SkillModule::MathFacts, "addition", 3, &seen, &mut rng)
            .unwrap();
        assert!(seen.contains(&served.fingerprint()));
    }

    #[test]
    fn generation_errors_pass_through() {
        let service = QuestionService::new();
        let mut rng = StdRng::seed_from_u64(43);
        let err = service
            .next_question(SkillModule::MathFacts, "addition", 9, &SeenQuestions::new(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, GeneratorError::LevelOutOfRange { .. }));
    }

    #[test]
    fn exclude_param_round_trips() {
        let mut seen = SeenQuestions::new();
        seen.insert("math-facts:addition:00000000000000aa");
        seen.insert("ratios:equivalents:00000000000000bb");

        let param = seen.to_param();
        assert_eq!(SeenQuestions::from_param(&param), seen);
    }

    #[test]
    fn blank_param_items_are_dropped() {
        let seen = SeenQuestions::from_param(" , math-facts:addition:00000000000000aa ,,");
        assert_eq!(seen.len(), 1);
        assert!(seen.contains("math-facts:addition:00000000000000aa"));
    }
}
