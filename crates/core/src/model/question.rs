use thiserror::Error;

use crate::model::{QuestionId, SkillModule};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question answer cannot be empty")]
    EmptyAnswer,

    #[error("a multi-select question needs at least two choices")]
    TooFewChoices,

    #[error("a multi-select question needs at least one correct option")]
    NoCorrectOption,

    #[error("correct option {option:?} is not among the choices")]
    CorrectNotInChoices { option: String },

    #[error("duplicate choice {option:?}")]
    DuplicateChoice { option: String },
}

//
// ─── ANSWER KEY ────────────────────────────────────────────────────────────────
//

/// How a question is graded.
///
/// `Exact` compares the learner's input against a single expected string.
/// `MultiSelect` expects a comma-separated selection out of `choices`, graded
/// against `correct`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerKey {
    Exact(String),
    MultiSelect {
        choices: Vec<String>,
        correct: Vec<String>,
    },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A generated practice question. Immutable once built; consumed once per
/// answer submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    module: SkillModule,
    skill: String,
    level: u8,
    prompt: String,
    answer: AnswerKey,
}

impl Question {
    /// Build an exact-answer question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyPrompt` or `QuestionError::EmptyAnswer`
    /// when either string is blank.
    pub fn exact(
        module: SkillModule,
        skill: impl Into<String>,
        level: u8,
        prompt: impl Into<String>,
        answer: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        let answer = answer.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if answer.trim().is_empty() {
            return Err(QuestionError::EmptyAnswer);
        }

        Ok(Self {
            id: QuestionId::generate(),
            module,
            skill: skill.into(),
            level,
            prompt,
            answer: AnswerKey::Exact(answer),
        })
    }

    /// Build a multi-select question.
    ///
    /// Guarantees the correct-answer invariant at construction time: a
    /// multi-select question can never exist with zero correct options, with a
    /// correct option missing from its choices, or with duplicate choices.
    ///
    /// # Errors
    ///
    /// Returns a `QuestionError` describing the violated invariant.
    pub fn multi_select(
        module: SkillModule,
        skill: impl Into<String>,
        level: u8,
        prompt: impl Into<String>,
        choices: Vec<String>,
        correct: Vec<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if choices.len() < 2 {
            return Err(QuestionError::TooFewChoices);
        }
        if correct.is_empty() {
            return Err(QuestionError::NoCorrectOption);
        }
        for (i, choice) in choices.iter().enumerate() {
            if choices[..i].contains(choice) {
                return Err(QuestionError::DuplicateChoice {
                    option: choice.clone(),
                });
            }
        }
        for option in &correct {
            if !choices.contains(option) {
                return Err(QuestionError::CorrectNotInChoices {
                    option: option.clone(),
                });
            }
        }

        Ok(Self {
            id: QuestionId::generate(),
            module,
            skill: skill.into(),
            level,
            prompt,
            answer: AnswerKey::MultiSelect { choices, correct },
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
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
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn answer(&self) -> &AnswerKey {
        &self.answer
    }

    /// The choice list shown to the learner, when the question has one.
    #[must_use]
    pub fn choices(&self) -> Option<&[String]> {
        match &self.answer {
            AnswerKey::Exact(_) => None,
            AnswerKey::MultiSelect { choices, .. } => Some(choices),
        }
    }

    /// Stable content identifier used by the duplicate-avoidance layer.
    ///
    /// Two generated questions with the same module, skill and prompt share a
    /// fingerprint even though each serving mints a fresh `QuestionId`.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        format!(
            "{}:{}:{:016x}",
            self.module.as_str(),
            self.skill,
            fnv1a(self.prompt.as_bytes())
        )
    }
}

// 64-bit FNV-1a. The fingerprint must be stable across processes, which rules
// out the std hasher's per-instance keys.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET_BASIS;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
