//! Randomized question generators, one module per skill family.
//!
//! Every generator draws operands through a level-indexed rule table and
//! produces a validated `Question`. Given a seeded RNG the output is
//! reproducible; uniqueness across calls is probabilistic, so callers layer
//! duplicate exclusion on top (see `question_service`).

use rand::Rng;
use thiserror::Error;

use math_core::model::{Question, QuestionError, SkillModule};

pub mod decimals;
pub mod facts;
pub mod fractions;
pub mod ratios;

pub use decimals::DecimalSkill;
pub use fractions::FractionSkill;
pub use ratios::{RatioFormat, RatioSkill};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// A generation failure is fatal: no partial question is ever returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GeneratorError {
    #[error("unknown {module} skill: {skill}")]
    UnknownSkill { module: SkillModule, skill: String },

    #[error("level {level} is not configured for {module}")]
    LevelOutOfRange { module: SkillModule, level: u8 },

    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// Look up a level-indexed rule-table entry. Levels are 1-based.
pub(crate) fn level_entry<T: Copy>(
    table: &[T],
    module: SkillModule,
    level: u8,
) -> Result<T, GeneratorError> {
    level
        .checked_sub(1)
        .and_then(|idx| table.get(usize::from(idx)))
        .copied()
        .ok_or(GeneratorError::LevelOutOfRange { module, level })
}

fn unknown_skill(module: SkillModule, skill: &str) -> GeneratorError {
    GeneratorError::UnknownSkill {
        module,
        skill: skill.to_string(),
    }
}

//
// ─── DISPATCH ──────────────────────────────────────────────────────────────────
//

/// Generate one question for `module`/`skill` at the given level.
///
/// # Errors
///
/// Returns `GeneratorError::UnknownSkill` when the skill name does not exist
/// in the module, and `GeneratorError::LevelOutOfRange` when the module's
/// rule table has no entry for the level.
pub fn generate<R: Rng>(
    module: SkillModule,
    skill: &str,
    level: u8,
    rng: &mut R,
) -> Result<Question, GeneratorError> {
    match module {
        SkillModule::MathFacts => {
            let operator = skill
                .parse()
                .map_err(|_| unknown_skill(module, skill))?;
            facts::generate(operator, level, rng)
        }
        SkillModule::Ratios => {
            let ratio_skill = skill
                .parse::<RatioSkill>()
                .map_err(|_| unknown_skill(module, skill))?;
            ratios::generate(ratio_skill, level, rng)
        }
        SkillModule::Fractions => {
            let fraction_skill = skill
                .parse::<FractionSkill>()
                .map_err(|_| unknown_skill(module, skill))?;
            fractions::generate(fraction_skill, level, rng)
        }
        SkillModule::DecimalDefender => {
            let decimal_skill = skill
                .parse::<DecimalSkill>()
                .map_err(|_| unknown_skill(module, skill))?;
            decimals::generate(decimal_skill, level, rng)
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
