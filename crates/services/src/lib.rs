#![forbid(unsafe_code)]

pub mod error;
pub mod generator;
pub mod practice;
pub mod progress_service;
pub mod question_service;
pub mod recommendations;
pub mod tokens;

pub use math_core::Clock;

pub use error::{PracticeError, ProgressServiceError};
pub use generator::{GeneratorError, generate};
pub use practice::{PracticeSession, SessionProgress};
pub use progress_service::{CompletionOutcome, ProgressService, SkillCompletion};
pub use question_service::{DUPLICATE_RETRY_LIMIT, QuestionService, SeenQuestions};
pub use recommendations::{Recommendation, recommend};
pub use tokens::TokenLedger;
