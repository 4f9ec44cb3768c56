mod grade;
mod ids;
mod module;
mod operator;
mod progress;
mod question;
mod session;

pub use grade::{Grade, ParseGradeError};
pub use ids::{ParseIdError, QuestionId, UserId};
pub use module::{ParseModuleError, SkillModule};
pub use operator::{Operator, ParseOperatorError};
pub use progress::{MAX_LEVEL, OperatorProgress, ProgressError, UserProgress};
pub use question::{AnswerKey, Question, QuestionError};
pub use session::{SessionResult, SessionResultError};
