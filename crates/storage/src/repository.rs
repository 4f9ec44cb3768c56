use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use math_core::model::{SessionResult, SkillModule, UserId, UserProgress};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of one finished session.
///
/// This mirrors the domain `SessionResult` (plus the pass flag derived at
/// scoring time) so repositories can serialize without leaking storage
/// concerns into the domain layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionLogRecord {
    pub id: Option<i64>,
    pub user_id: UserId,
    pub module: SkillModule,
    pub skill: String,
    pub correct: u32,
    pub total: u32,
    pub duration_secs: u32,
    pub tokens_earned: u32,
    pub passed: bool,
    pub completed_at: DateTime<Utc>,
}

impl SessionLogRecord {
    #[must_use]
    pub fn from_result(
        user_id: UserId,
        skill: impl Into<String>,
        result: &SessionResult,
        passed: bool,
    ) -> Self {
        Self {
            id: None,
            user_id,
            module: result.module(),
            skill: skill.into(),
            correct: result.correct(),
            total: result.total(),
            duration_secs: result.duration_secs(),
            tokens_earned: result.tokens_earned(),
            passed,
            completed_at: result.completed_at(),
        }
    }
}

/// Repository contract for learner progress records.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch a learner's progress by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_progress(&self, user: UserId) -> Result<UserProgress, StorageError>;

    /// Persist or update a learner's full progress record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn upsert_progress(&self, progress: &UserProgress) -> Result<(), StorageError>;

    /// Atomically add tokens to a learner's balance, returning the new value.
    ///
    /// Used by the flush path, where the client sends a queued delta rather
    /// than a full progress record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the learner does not exist.
    async fn add_tokens(&self, user: UserId, delta: u32) -> Result<u32, StorageError>;
}

/// Repository contract for the session log.
#[async_trait]
pub trait SessionLogRepository: Send + Sync {
    /// Append a finished session, returning its log ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn record_session(&self, record: SessionLogRecord) -> Result<i64, StorageError>;

    /// All logged sessions for a learner, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure.
    async fn sessions_for_user(&self, user: UserId)
    -> Result<Vec<SessionLogRecord>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<HashMap<UserId, UserProgress>>>,
    sessions: Arc<Mutex<Vec<SessionLogRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn get_progress(&self, user: UserId) -> Result<UserProgress, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&user).cloned().ok_or(StorageError::NotFound)
    }

    async fn upsert_progress(&self, progress: &UserProgress) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(progress.user_id(), progress.clone());
        Ok(())
    }

    async fn add_tokens(&self, user: UserId, delta: u32) -> Result<u32, StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let progress = guard.get_mut(&user).ok_or(StorageError::NotFound)?;
        progress.add_tokens(delta);
        Ok(progress.tokens())
    }
}

#[async_trait]
impl SessionLogRepository for InMemoryRepository {
    async fn record_session(&self, mut record: SessionLogRecord) -> Result<i64, StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = i64::try_from(guard.len() + 1)
            .map_err(|_| StorageError::Serialization("session log overflow".into()))?;
        record.id = Some(id);
        guard.push(record);
        Ok(id)
    }

    async fn sessions_for_user(
        &self,
        user: UserId,
    ) -> Result<Vec<SessionLogRecord>, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .filter(|r| r.user_id == user)
            .cloned()
            .collect())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub sessions: Arc<dyn SessionLogRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let sessions: Arc<dyn SessionLogRepository> = Arc::new(repo);
        Self { progress, sessions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use math_core::model::{Grade, Operator};
    use math_core::time::fixed_now;

    fn build_progress(id: u64) -> UserProgress {
        let mut p = UserProgress::new(UserId::new(id), Grade::Fourth);
        p.complete_step(Operator::Addition, "Adding 0 and 1");
        p.add_tokens(12);
        p
    }

    fn build_record(user: u64) -> SessionLogRecord {
        let result =
            SessionResult::new(SkillModule::MathFacts, 10, 12, 240, 10, fixed_now()).unwrap();
        SessionLogRecord::from_result(UserId::new(user), "addition", &result, true)
    }

    #[tokio::test]
    async fn progress_round_trips() {
        let repo = InMemoryRepository::new();
        let progress = build_progress(1);
        repo.upsert_progress(&progress).await.unwrap();

        let fetched = repo.get_progress(UserId::new(1)).await.unwrap();
        assert_eq!(fetched, progress);
    }

    #[tokio::test]
    async fn missing_progress_is_not_found() {
        let repo = InMemoryRepository::new();
        assert!(matches!(
            repo.get_progress(UserId::new(99)).await.unwrap_err(),
            StorageError::NotFound
        ));
    }

    #[tokio::test]
    async fn add_tokens_returns_the_new_balance() {
        let repo = InMemoryRepository::new();
        repo.upsert_progress(&build_progress(1)).await.unwrap();

        let balance = repo.add_tokens(UserId::new(1), 8).await.unwrap();
        assert_eq!(balance, 20);
        assert!(matches!(
            repo.add_tokens(UserId::new(2), 8).await.unwrap_err(),
            StorageError::NotFound
        ));
    }

    #[tokio::test]
    async fn session_log_assigns_ids_and_filters_by_user() {
        let repo = InMemoryRepository::new();
        let first = repo.record_session(build_record(1)).await.unwrap();
        let second = repo.record_session(build_record(2)).await.unwrap();
        assert!(second > first);

        let logs = repo.sessions_for_user(UserId::new(1)).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].id, Some(first));
        assert_eq!(logs[0].skill, "addition");
    }
}
