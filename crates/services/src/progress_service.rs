//! Persisted progress orchestration: scoring a reported session, advancing
//! the learner's progression, and awarding tokens.

use serde::{Deserialize, Serialize};

use math_core::Clock;
use math_core::model::{Grade, Operator, SessionResult, SkillModule, UserId, UserProgress};
use math_core::scoring::{SessionScore, TokenPolicy, score_session};
use storage::repository::{SessionLogRecord, Storage, StorageError};

use crate::error::ProgressServiceError;
use crate::recommendations::{Recommendation, recommend};

/// A client's report of one finished skill session.
///
/// `operator` is present for operator-based modules (Math Facts); the other
/// modules have no progression steps to advance, only tokens to award.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCompletion {
    pub module: SkillModule,
    pub operator: Option<Operator>,
    pub skill: String,
    pub correct: u32,
    pub total: u32,
    pub duration_secs: u32,
}

/// Everything a client needs to render the end-of-session screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionOutcome {
    pub score: SessionScore,
    pub result_id: i64,
    pub mastered: bool,
    pub balance: u32,
}

/// Clock-carrying service over the progress and session-log repositories.
#[derive(Clone)]
pub struct ProgressService {
    storage: Storage,
    clock: Clock,
}

impl ProgressService {
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            clock: Clock::default(),
        }
    }

    /// Override the clock (usually for deterministic testing).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Create (or reset) a learner's progress record.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn create_user(
        &self,
        user: UserId,
        grade: Grade,
    ) -> Result<UserProgress, ProgressServiceError> {
        let progress = UserProgress::new(user, grade);
        self.storage.progress.upsert_progress(&progress).await?;
        Ok(progress)
    }

    /// Fetch a learner's progress.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::UnknownUser` for a missing record.
    pub async fn progress(&self, user: UserId) -> Result<UserProgress, ProgressServiceError> {
        match self.storage.progress.get_progress(user).await {
            Ok(progress) => Ok(progress),
            Err(StorageError::NotFound) => Err(ProgressServiceError::UnknownUser(user)),
            Err(e) => Err(e.into()),
        }
    }

    /// Authoritative token balance.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::UnknownUser` for a missing record.
    pub async fn balance(&self, user: UserId) -> Result<u32, ProgressServiceError> {
        Ok(self.progress(user).await?.tokens())
    }

    /// Apply a queued token delta from the client's unload flush, returning
    /// the new authoritative balance.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::UnknownUser` for a missing record.
    pub async fn flush_tokens(
        &self,
        user: UserId,
        delta: u32,
    ) -> Result<u32, ProgressServiceError> {
        match self.storage.progress.add_tokens(user, delta).await {
            Ok(balance) => Ok(balance),
            Err(StorageError::NotFound) => Err(ProgressServiceError::UnknownUser(user)),
            Err(e) => Err(e.into()),
        }
    }

    /// Score a reported session and persist its consequences.
    ///
    /// A passed session for an operator module marks the practiced step
    /// complete; every session records a streak attempt, awards its tokens,
    /// and is appended to the session log. The returned `mastered` flag
    /// reflects progression completeness only, never this session's score.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::UnknownUser` for a missing learner,
    /// `ProgressServiceError::Score` for inconsistent counts, and propagates
    /// storage failures.
    pub async fn complete_skill(
        &self,
        user: UserId,
        completion: SkillCompletion,
    ) -> Result<CompletionOutcome, ProgressServiceError> {
        let policy = TokenPolicy::for_module(completion.module);
        let score = score_session(completion.correct, completion.total, &policy)?;

        let mut progress = self.progress(user).await?;
        if let Some(operator) = completion.operator {
            if score.passed {
                progress.complete_step(operator, &completion.skill);
            }
            progress.record_attempt(operator, score.passed);
        }
        progress.add_tokens(score.tokens_earned);
        self.storage.progress.upsert_progress(&progress).await?;

        let result = SessionResult::new(
            completion.module,
            completion.correct,
            completion.total,
            completion.duration_secs,
            score.tokens_earned,
            self.clock.now(),
        )?;
        let record = SessionLogRecord::from_result(user, &completion.skill, &result, score.passed);
        let result_id = self.storage.sessions.record_session(record).await?;

        let mastered = completion
            .operator
            .is_some_and(|operator| progress.is_operator_mastered(operator));

        Ok(CompletionOutcome {
            score,
            result_id,
            mastered,
            balance: progress.tokens(),
        })
    }

    /// Per-operator next-step and mastery view.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::UnknownUser` for a missing record.
    pub async fn recommendations(
        &self,
        user: UserId,
    ) -> Result<Vec<Recommendation>, ProgressServiceError> {
        Ok(recommend(&self.progress(user).await?))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
