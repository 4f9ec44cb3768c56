//! Decimal Defender generators.
//!
//! Every value is handled as an integer scaled by its number of decimal
//! places. Rounding, comparison and addition all happen in that scaled
//! space, so no float round-trip can smuggle in representation error.

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use math_core::model::{Question, SkillModule};

use super::{GeneratorError, level_entry};

/// Decimal places per level.
const PLACES: &[u32] = &[1, 2, 2, 3, 3];

/// Place names, indexed by position after the decimal point.
const PLACE_NAMES: &[&str] = &["tenths", "hundredths", "thousandths"];
const PLACE_NAMES_SINGULAR: &[&str] = &["tenth", "hundredth", "thousandth"];

/// Skills of the Decimal Defender module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalSkill {
    Rounding,
    Compare,
    PlaceValue,
    Add,
}

impl DecimalSkill {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DecimalSkill::Rounding => "rounding",
            DecimalSkill::Compare => "compare",
            DecimalSkill::PlaceValue => "place_value",
            DecimalSkill::Add => "add",
        }
    }
}

impl fmt::Display for DecimalSkill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecimalSkill {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rounding" => Ok(DecimalSkill::Rounding),
            "compare" => Ok(DecimalSkill::Compare),
            "place_value" => Ok(DecimalSkill::PlaceValue),
            "add" => Ok(DecimalSkill::Add),
            _ => Err(()),
        }
    }
}

/// Generate one Decimal Defender question.
///
/// # Errors
///
/// Returns `GeneratorError::LevelOutOfRange` when the level has no table
/// entry, and propagates question-construction failures.
pub fn generate<R: Rng>(
    skill: DecimalSkill,
    level: u8,
    rng: &mut R,
) -> Result<Question, GeneratorError> {
    let places = level_entry(PLACES, SkillModule::DecimalDefender, level)?;
    let (prompt, answer) = match skill {
        DecimalSkill::Rounding => {
            let value = random_scaled(places, rng);
            let target = if places == 1 {
                "whole number".to_string()
            } else {
                PLACE_NAMES_SINGULAR[places as usize - 2].to_string()
            };
            (
                format!(
                    "Round {} to the nearest {target}.",
                    format_scaled(value, places)
                ),
                format_scaled(round_half_up(value), places - 1),
            )
        }
        DecimalSkill::Compare => {
            let a = random_scaled(places, rng);
            let b = loop {
                let b = random_scaled(places, rng);
                if b != a {
                    break b;
                }
            };
            let greater = a.max(b);
            (
                format!(
                    "Which is greater: {} or {}?",
                    format_scaled(a, places),
                    format_scaled(b, places)
                ),
                format_scaled(greater, places),
            )
        }
        DecimalSkill::PlaceValue => {
            let value = random_scaled(places, rng);
            let position = rng.random_range(1..=places);
            let digit = (value / 10_u64.pow(places - position)) % 10;
            (
                format!(
                    "What digit is in the {} place of {}?",
                    PLACE_NAMES[position as usize - 1],
                    format_scaled(value, places)
                ),
                digit.to_string(),
            )
        }
        DecimalSkill::Add => {
            let a = random_scaled(places, rng);
            let b = random_scaled(places, rng);
            (
                format!(
                    "What is {} + {}?",
                    format_scaled(a, places),
                    format_scaled(b, places)
                ),
                format_scaled(a + b, places),
            )
        }
    };

    Ok(Question::exact(
        SkillModule::DecimalDefender,
        skill.as_str(),
        level,
        prompt,
        answer,
    )?)
}

/// A value below 10 with the given number of decimal places, as a scaled
/// integer.
fn random_scaled<R: Rng>(places: u32, rng: &mut R) -> u64 {
    rng.random_range(0..10 * 10_u64.pow(places))
}

/// Drop the last decimal digit, rounding half away from zero.
fn round_half_up(value: u64) -> u64 {
    (value + 5) / 10
}

fn format_scaled(value: u64, places: u32) -> String {
    if places == 0 {
        return value.to_string();
    }
    let scale = 10_u64.pow(places);
    format!(
        "{}.{:0width$}",
        value / scale,
        value % scale,
        width = places as usize
    )
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
