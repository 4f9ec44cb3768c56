//! Shared error types for the services crate.

use thiserror::Error;

use math_core::model::{SessionResultError, UserId};
use math_core::scoring::ScoreError;
use storage::repository::StorageError;

use crate::generator::GeneratorError;

/// Errors emitted by `PracticeSession`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PracticeError {
    #[error("a practice session needs at least one question")]
    Empty,
    #[error("session is already complete")]
    AlreadyComplete,
    #[error("no question is awaiting an answer")]
    NoActiveQuestion,
    #[error("session still has unanswered questions")]
    NotFinished,
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Session(#[from] SessionResultError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error("unknown user {0}")]
    UnknownUser(UserId),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Session(#[from] SessionResultError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
