use std::fmt;
use std::str::FromStr;

use rand::Rng;

use math_core::model::{Question, SkillModule};

use super::{GeneratorError, level_entry};

/// Largest denominator per level.
const MAX_DEN: &[u32] = &[4, 6, 8, 10, 12];

/// Skills of the Fractions module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FractionSkill {
    Identify,
    Compare,
    Equivalent,
    Add,
}

impl FractionSkill {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FractionSkill::Identify => "identify",
            FractionSkill::Compare => "compare",
            FractionSkill::Equivalent => "equivalent",
            FractionSkill::Add => "add",
        }
    }
}

impl fmt::Display for FractionSkill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FractionSkill {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "identify" => Ok(FractionSkill::Identify),
            "compare" => Ok(FractionSkill::Compare),
            "equivalent" => Ok(FractionSkill::Equivalent),
            "add" => Ok(FractionSkill::Add),
            _ => Err(()),
        }
    }
}

/// Generate one fractions question.
///
/// # Errors
///
/// Returns `GeneratorError::LevelOutOfRange` when the level has no table
/// entry, and propagates question-construction failures.
pub fn generate<R: Rng>(
    skill: FractionSkill,
    level: u8,
    rng: &mut R,
) -> Result<Question, GeneratorError> {
    let max_den = level_entry(MAX_DEN, SkillModule::Fractions, level)?;
    let (prompt, answer) = match skill {
        FractionSkill::Identify => {
            let den = rng.random_range(2..=max_den);
            let num = rng.random_range(1..den);
            (
                format!(
                    "A shape is cut into {den} equal parts and {num} of them are shaded. \
                     What fraction of the shape is shaded?"
                ),
                format!("{num}/{den}"),
            )
        }
        FractionSkill::Compare => {
            let (a, b) = proper_fraction(max_den, rng);
            let (c, d) = loop {
                let (c, d) = proper_fraction(max_den, rng);
                // regenerate until the pair differs in value
                if u64::from(a) * u64::from(d) != u64::from(c) * u64::from(b) {
                    break (c, d);
                }
            };
            let greater = if u64::from(a) * u64::from(d) > u64::from(c) * u64::from(b) {
                format!("{a}/{b}")
            } else {
                format!("{c}/{d}")
            };
            (
                format!("Which fraction is greater: {a}/{b} or {c}/{d}?"),
                greater,
            )
        }
        FractionSkill::Equivalent => {
            let (num, den) = proper_fraction(max_den, rng);
            let k = rng.random_range(2..=4);
            (
                format!(
                    "Fill in the missing numerator: {num}/{den} = ?/{}",
                    den * k
                ),
                (num * k).to_string(),
            )
        }
        FractionSkill::Add => {
            let den = rng.random_range(2..=max_den);
            let a = rng.random_range(1..den);
            let b = rng.random_range(1..den);
            (
                format!("What is {a}/{den} + {b}/{den}? Give your answer as a fraction."),
                format!("{}/{den}", a + b),
            )
        }
    };

    Ok(Question::exact(
        SkillModule::Fractions,
        skill.as_str(),
        level,
        prompt,
        answer,
    )?)
}

fn proper_fraction<R: Rng>(max_den: u32, rng: &mut R) -> (u32, u32) {
    let den = rng.random_range(2..=max_den);
    let num = rng.random_range(1..den);
    (num, den)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use math_core::model::AnswerKey;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn answer(q: &Question) -> &str {
        match q.answer() {
            AnswerKey::Exact(a) => a,
            AnswerKey::MultiSelect { .. } => panic!("fractions are exact-answer"),
        }
    }

    fn parse_fraction(s: &str) -> (u32, u32) {
        let (n, d) = s.split_once('/').expect("fraction shape");
        (n.parse().unwrap(), d.parse().unwrap())
    }

    #[test]
    fn identify_answers_shaded_over_parts() {
        let mut rng = StdRng::seed_from_u64(20);
        for _ in 0..100 {
            let q = generate(FractionSkill::Identify, 2, &mut rng).unwrap();
            let (num, den) = parse_fraction(answer(&q));
            assert!(num < den, "{}", q.prompt());
            assert!(den <= 6, "{}", q.prompt());
            assert!(q.prompt().contains(&format!("{den} equal parts")));
            assert!(q.prompt().contains(&format!("{num} of them")));
        }
    }

    #[test]
    fn compare_pairs_are_never_equal_and_the_answer_is_the_larger() {
        let mut rng = StdRng::seed_from_u64(21);
        for level in 1..=5 {
            for _ in 0..100 {
                let q = generate(FractionSkill::Compare, level, &mut rng).unwrap();
                // prompts look like "Which fraction is greater: 1/2 or 3/8?"
                let (left, right) = q
                    .prompt()
                    .strip_prefix("Which fraction is greater: ")
                    .and_then(|rest| rest.strip_suffix('?'))
                    .unwrap()
                    .split_once(" or ")
                    .unwrap();
                let (a, b) = parse_fraction(left);
                let (c, d) = parse_fraction(right);
                assert_ne!(a * d, c * b, "{}", q.prompt());

                let expected = if a * d > c * b { left } else { right };
                assert_eq!(answer(&q), expected);
            }
        }
    }

    #[test]
    fn equivalent_scales_the_numerator_with_the_denominator() {
        let mut rng = StdRng::seed_from_u64(22);
        for _ in 0..100 {
            let q = generate(FractionSkill::Equivalent, 3, &mut rng).unwrap();
            // prompts look like "Fill in the missing numerator: 2/3 = ?/12"
            let rest = q
                .prompt()
                .strip_prefix("Fill in the missing numerator: ")
                .unwrap();
            let (from, to) = rest.split_once(" = ?/").unwrap();
            let (num, den) = parse_fraction(from);
            let scaled_den: u32 = to.parse().unwrap();
            assert_eq!(scaled_den % den, 0);

            let expected = num * (scaled_den / den);
            assert_eq!(answer(&q), expected.to_string());
        }
    }

    #[test]
    fn add_uses_a_common_denominator() {
        let mut rng = StdRng::seed_from_u64(23);
        for _ in 0..100 {
            let q = generate(FractionSkill::Add, 4, &mut rng).unwrap();
            // prompts look like "What is 1/4 + 2/4? ..."
            let rest = q.prompt().strip_prefix("What is ").unwrap();
            let (sum, _) = rest.split_once('?').unwrap();
            let (left, right) = sum.split_once(" + ").unwrap();
            let (a, b) = parse_fraction(left);
            let (c, d) = parse_fraction(right);
            assert_eq!(b, d, "{}", q.prompt());

            let (num, den) = parse_fraction(answer(&q));
            assert_eq!((num, den), (a + c, b));
        }
    }

    #[test]
    fn denominators_respect_the_level_table() {
        let mut rng = StdRng::seed_from_u64(24);
        for (level, max_den) in [(1, 4), (3, 8), (5, 12)] {
            for _ in 0..50 {
                let q = generate(FractionSkill::Identify, level, &mut rng).unwrap();
                let (_, den) = parse_fraction(answer(&q));
                assert!(den <= max_den, "level {level}: {}", q.prompt());
            }
        }
    }
}
