use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::SliceRandom;

use math_core::model::{Question, SkillModule};

use super::{GeneratorError, level_entry};

/// Largest base-ratio term per level.
const BASE_MAX: &[u32] = &[5, 8, 10, 12, 15];

/// Multipliers used to build the guaranteed-correct equivalent options.
const LOW_MULTIPLIER: (u32, u32) = (2, 3);
const HIGH_MULTIPLIER: (u32, u32) = (4, 5);

/// Skills of the Ratios module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioSkill {
    WriteForm,
    Equivalents,
}

impl RatioSkill {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RatioSkill::WriteForm => "write_form",
            RatioSkill::Equivalents => "equivalents",
        }
    }
}

impl fmt::Display for RatioSkill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RatioSkill {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "write_form" => Ok(RatioSkill::WriteForm),
            "equivalents" => Ok(RatioSkill::Equivalents),
            _ => Err(()),
        }
    }
}

/// The notation a write-form question asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioFormat {
    Colon,
    Fraction,
    Word,
}

impl RatioFormat {
    pub const ALL: [RatioFormat; 3] = [
        RatioFormat::Colon,
        RatioFormat::Fraction,
        RatioFormat::Word,
    ];
}

/// Generate one ratios question.
///
/// # Errors
///
/// Returns `GeneratorError::LevelOutOfRange` when the level has no table
/// entry, and propagates question-construction failures.
pub fn generate<R: Rng>(
    skill: RatioSkill,
    level: u8,
    rng: &mut R,
) -> Result<Question, GeneratorError> {
    let max = level_entry(BASE_MAX, SkillModule::Ratios, level)?;
    match skill {
        RatioSkill::WriteForm => {
            let a = rng.random_range(1..=max);
            let b = rng.random_range(1..=max);
            let format = RatioFormat::ALL[rng.random_range(0..RatioFormat::ALL.len())];
            write_form_question(a, b, format, level)
        }
        RatioSkill::Equivalents if level < 3 => yes_no_question(max, level, rng),
        RatioSkill::Equivalents => multi_select_question(max, level, rng),
    }
}

/// Build a write-form question for the ratio `a` to `b` in the given
/// notation.
///
/// The prompt spells the ratio in a notation other than the one asked for,
/// so the answer is never sitting in the question text.
///
/// # Errors
///
/// Propagates question-construction failures.
pub fn write_form_question(
    a: u32,
    b: u32,
    format: RatioFormat,
    level: u8,
) -> Result<Question, GeneratorError> {
    let (prompt, answer) = match format {
        RatioFormat::Colon => (
            format!("Write the ratio {a} to {b} using a colon."),
            format!("{a}:{b}"),
        ),
        RatioFormat::Fraction => (
            format!("Write the ratio {a} to {b} as a fraction."),
            format!("{a}/{b}"),
        ),
        RatioFormat::Word => (
            format!("Write the ratio {a}:{b} in words."),
            format!("{a} to {b}"),
        ),
    };
    Ok(Question::exact(
        SkillModule::Ratios,
        RatioSkill::WriteForm.as_str(),
        level,
        prompt,
        answer,
    )?)
}

/// Cross-multiplication equivalence test for `a:b` vs `c:d`.
fn is_equivalent(a: u32, b: u32, c: u32, d: u32) -> bool {
    u64::from(a) * u64::from(d) == u64::from(b) * u64::from(c)
}

fn yes_no_question<R: Rng>(
    max: u32,
    level: u8,
    rng: &mut R,
) -> Result<Question, GeneratorError> {
    let a = rng.random_range(1..=max);
    let b = rng.random_range(1..=max);
    let k = rng.random_range(2..=4);

    let equivalent = rng.random_bool(0.5);
    let (c, d) = if equivalent {
        (a * k, b * k)
    } else {
        // Offsetting one term of a scaled copy can never land back on an
        // equivalent ratio: cross-multiplying leaves a remainder of delta * b.
        let delta = rng.random_range(1..=2);
        (a * k + delta, b * k)
    };

    let prompt = format!("Is {c}:{d} equivalent to {a}:{b}?");
    let answer = if equivalent { "yes" } else { "no" };
    Ok(Question::exact(
        SkillModule::Ratios,
        RatioSkill::Equivalents.as_str(),
        level,
        prompt,
        answer,
    )?)
}

fn multi_select_question<R: Rng>(
    max: u32,
    level: u8,
    rng: &mut R,
) -> Result<Question, GeneratorError> {
    let a = rng.random_range(1..=max);
    let b = rng.random_range(1..=max);

    // Two scaled copies with multipliers drawn from disjoint ranges, so the
    // correct options can never collide with each other.
    let k1 = rng.random_range(LOW_MULTIPLIER.0..=LOW_MULTIPLIER.1);
    let k2 = rng.random_range(HIGH_MULTIPLIER.0..=HIGH_MULTIPLIER.1);
    let correct = vec![
        format!("{}:{}", a * k1, b * k1),
        format!("{}:{}", a * k2, b * k2),
    ];

    let mut choices = correct.clone();
    while choices.len() < 4 {
        let k = rng.random_range(2..=5);
        let delta = rng.random_range(1..=3);
        let (c, d) = (a * k + delta, b * k);
        let candidate = format!("{c}:{d}");
        if !is_equivalent(a, b, c, d) && !choices.contains(&candidate) {
            choices.push(candidate);
        }
    }
    choices.shuffle(rng);

    let prompt = format!("Which ratios are equivalent to {a}:{b}? Select all that apply.");
    Ok(Question::multi_select(
        SkillModule::Ratios,
        RatioSkill::Equivalents.as_str(),
        level,
        prompt,
        choices,
        correct,
    )?)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
