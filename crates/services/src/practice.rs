//! In-memory practice session state machine.
//!
//! A session serves a fixed number of questions one at a time through the
//! duplicate-avoidance layer, grades each submitted answer, and produces a
//! scored `SessionResult` once every question has been answered.

use chrono::{DateTime, Utc};
use rand::Rng;

use math_core::check_answer;
use math_core::model::{Question, SessionResult, SkillModule};
use math_core::scoring::{SessionScore, TokenPolicy, score_session};

use crate::error::PracticeError;
use crate::question_service::{QuestionService, SeenQuestions};

/// Aggregated view of session progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: u32,
    pub answered: u32,
    pub remaining: u32,
    pub is_complete: bool,
}

/// One learner's run through a fixed number of questions for a single skill.
#[derive(Debug, Clone)]
pub struct PracticeSession {
    module: SkillModule,
    skill: String,
    level: u8,
    total_questions: u32,
    service: QuestionService,
    seen: SeenQuestions,
    current: Option<Question>,
    answered: u32,
    correct: u32,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl PracticeSession {
    /// Start a session.
    ///
    /// `started_at` should come from the services layer clock to keep time
    /// deterministic.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Empty` when `total_questions` is zero.
    pub fn new(
        module: SkillModule,
        skill: impl Into<String>,
        level: u8,
        total_questions: u32,
        started_at: DateTime<Utc>,
    ) -> Result<Self, PracticeError> {
        if total_questions == 0 {
            return Err(PracticeError::Empty);
        }
        Ok(Self {
            module,
            skill: skill.into(),
            level,
            total_questions,
            service: QuestionService::new(),
            seen: SeenQuestions::new(),
            current: None,
            answered: 0,
            correct: 0,
            started_at,
            completed_at: None,
        })
    }

    #[must_use]
    pub fn module(&self) -> SkillModule {
        self.module
    }

    #[must_use]
    pub fn skill(&self) -> &str {
        &self.skill
    }

    #[must_use]
    pub fn level(&self) -> u8 {
        self.level
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.total_questions,
            answered: self.answered,
            remaining: self.total_questions - self.answered,
            is_complete: self.is_complete(),
        }
    }

    /// The question currently awaiting an answer, or serve the next one.
    ///
    /// Calling again before an answer is submitted returns the same pending
    /// question; a session never has two questions in flight.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::AlreadyComplete` after the last answer, and
    /// propagates generation failures.
    pub fn next_question<R: Rng>(&mut self, rng: &mut R) -> Result<&Question, PracticeError> {
        if self.is_complete() {
            return Err(PracticeError::AlreadyComplete);
        }
        if self.current.is_none() {
            let question = self.service.next_question(
                self.module,
                &self.skill,
                self.level,
                &self.seen,
                rng,
            )?;
            self.seen.insert(question.fingerprint());
            self.current = Some(question);
        }
        self.current.as_ref().ok_or(PracticeError::NoActiveQuestion)
    }

    /// Grade the pending question and advance.
    ///
    /// `answered_at` should come from the services layer clock; the final
    /// submission stamps the session's completion time.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::AlreadyComplete` after the session finished
    /// and `PracticeError::NoActiveQuestion` when nothing was served yet.
    pub fn submit_answer(
        &mut self,
        answer: &str,
        answered_at: DateTime<Utc>,
    ) -> Result<bool, PracticeError> {
        if self.is_complete() {
            return Err(PracticeError::AlreadyComplete);
        }
        let question = self.current.take().ok_or(PracticeError::NoActiveQuestion)?;

        let correct = check_answer(&question, answer);
        if correct {
            self.correct += 1;
        }
        self.answered += 1;
        if self.answered == self.total_questions {
            self.completed_at = Some(answered_at);
        }
        Ok(correct)
    }

    /// Score the finished session under its module's token policy.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::NotFinished` while questions remain.
    pub fn finish(&self) -> Result<(SessionScore, SessionResult), PracticeError> {
        let completed_at = self.completed_at.ok_or(PracticeError::NotFinished)?;

        let policy = TokenPolicy::for_module(self.module);
        let score = score_session(self.correct, self.total_questions, &policy)?;

        let elapsed = completed_at
            .signed_duration_since(self.started_at)
            .num_seconds();
        let duration_secs = u32::try_from(elapsed.max(0)).unwrap_or(u32::MAX);

        let result = SessionResult::new(
            self.module,
            self.correct,
            self.total_questions,
            duration_secs,
            score.tokens_earned,
            completed_at,
        )?;
        Ok((score, result))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use math_core::model::AnswerKey;
    use math_core::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn expected_answer(question: &Question) -> String {
        match question.answer() {
            AnswerKey::Exact(a) => a.clone(),
            AnswerKey::MultiSelect { correct, .. } => correct.join(","),
        }
    }

    fn session(total: u32) -> PracticeSession {
        PracticeSession::new(SkillModule::MathFacts, "addition", 2, total, fixed_now()).unwrap()
    }

    #[test]
    fn zero_question_sessions_are_rejected() {
        let err =
            PracticeSession::new(SkillModule::MathFacts, "addition", 1, 0, fixed_now())
                .unwrap_err();
        assert!(matches!(err, PracticeError::Empty));
    }

    #[test]
    fn answering_before_serving_is_an_error() {
        let mut s = session(3);
        let err = s.submit_answer("4", fixed_now()).unwrap_err();
        assert!(matches!(err, PracticeError::NoActiveQuestion));
    }

    #[test]
    fn the_pending_question_is_stable_until_answered() {
        let mut s = session(3);
        let mut rng = StdRng::seed_from_u64(50);

        let first = s.next_question(&mut rng).unwrap().clone();
        let again = s.next_question(&mut rng).unwrap().clone();
        assert_eq!(first, again);
    }

    #[test]
    fn a_session_never_repeats_a_question_when_it_can_avoid_it() {
        let mut s = session(8);
        let mut rng = StdRng::seed_from_u64(51);
        let mut fingerprints = Vec::new();

        for _ in 0..8 {
            let q = s.next_question(&mut rng).unwrap();
            fingerprints.push(q.fingerprint());
            let answer = expected_answer(q);
            s.submit_answer(&answer, fixed_now()).unwrap();
        }

        let mut unique = fingerprints.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), fingerprints.len());
    }

    #[test]
    fn progress_counts_down_and_completes() {
        let mut s = session(2);
        let mut rng = StdRng::seed_from_u64(52);

        assert_eq!(
            s.progress(),
            SessionProgress {
                total: 2,
                answered: 0,
                remaining: 2,
                is_complete: false
            }
        );

        let answer = expected_answer(s.next_question(&mut rng).unwrap());
        s.submit_answer(&answer, fixed_now()).unwrap();
        assert_eq!(s.progress().remaining, 1);

        s.next_question(&mut rng).unwrap();
        s.submit_answer("definitely wrong", fixed_now() + Duration::seconds(90))
            .unwrap();
        assert!(s.progress().is_complete);
        assert_eq!(s.correct_count(), 1);
    }

    #[test]
    fn completed_sessions_refuse_further_answers() {
        let mut s = session(1);
        let mut rng = StdRng::seed_from_u64(53);

        s.next_question(&mut rng).unwrap();
        s.submit_answer("whatever", fixed_now()).unwrap();

        assert!(matches!(
            s.submit_answer("again", fixed_now()).unwrap_err(),
            PracticeError::AlreadyComplete
        ));
        assert!(matches!(
            s.next_question(&mut rng).unwrap_err(),
            PracticeError::AlreadyComplete
        ));
    }

    #[test]
    fn finish_requires_completion() {
        let s = session(2);
        assert!(matches!(s.finish().unwrap_err(), PracticeError::NotFinished));
    }

    #[test]
    fn finish_scores_under_the_module_policy() {
        let mut s = session(3);
        let mut rng = StdRng::seed_from_u64(54);

        for i in 0..3 {
            let q = s.next_question(&mut rng).unwrap();
            let answer = expected_answer(q);
            let at = fixed_now() + Duration::seconds(40 * (i + 1));
            s.submit_answer(&answer, at).unwrap();
        }

        let (score, result) = s.finish().unwrap();
        assert!(score.passed);
        // 3 correct at 1 token each, plus the perfect bonus
        assert_eq!(score.tokens_earned, 3 + 5);
        assert_eq!(result.correct(), 3);
        assert_eq!(result.duration_secs(), 120);
        assert_eq!(result.completed_at(), fixed_now() + Duration::seconds(120));
    }
}
