use rand::Rng;

use math_core::model::{Operator, Question, SkillModule};

use super::{GeneratorError, level_entry};

/// Operand cap per level for addition and subtraction facts.
const ADD_SUB_MAX: &[u32] = &[10, 20, 50, 100, 1000];
/// Factor cap per level for multiplication and division facts.
const FACTOR_MAX: &[u32] = &[5, 10, 12, 12, 15];

/// Generate one math-facts question for an operator.
///
/// Subtraction operands are ordered so the difference is never negative, and
/// division problems are built from a quotient and divisor so the division is
/// always exact.
///
/// # Errors
///
/// Returns `GeneratorError::LevelOutOfRange` when the level has no table
/// entry.
pub fn generate<R: Rng>(
    operator: Operator,
    level: u8,
    rng: &mut R,
) -> Result<Question, GeneratorError> {
    let (a, b, answer) = match operator {
        Operator::Addition => {
            let max = level_entry(ADD_SUB_MAX, SkillModule::MathFacts, level)?;
            let a = rng.random_range(0..=max);
            let b = rng.random_range(0..=max);
            (a, b, a + b)
        }
        Operator::Subtraction => {
            let max = level_entry(ADD_SUB_MAX, SkillModule::MathFacts, level)?;
            let a = rng.random_range(0..=max);
            let b = rng.random_range(0..=a);
            (a, b, a - b)
        }
        Operator::Multiplication => {
            let max = level_entry(FACTOR_MAX, SkillModule::MathFacts, level)?;
            let a = rng.random_range(0..=max);
            let b = rng.random_range(0..=max);
            (a, b, a * b)
        }
        Operator::Division => {
            let max = level_entry(FACTOR_MAX, SkillModule::MathFacts, level)?;
            let divisor = rng.random_range(1..=max);
            let quotient = rng.random_range(0..=max);
            (divisor * quotient, divisor, quotient)
        }
    };

    let prompt = format!("What is {a} {} {b}?", operator.symbol());
    Ok(Question::exact(
        SkillModule::MathFacts,
        operator.as_str(),
        level,
        prompt,
        answer.to_string(),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn operands(prompt: &str) -> (u32, u32) {
        // prompts look like "What is 12 × 7?"
        let mut parts = prompt
            .strip_prefix("What is ")
            .and_then(|rest| rest.strip_suffix('?'))
            .expect("prompt shape")
            .split_whitespace();
        let a = parts.next().unwrap().parse().unwrap();
        let _symbol = parts.next().unwrap();
        let b = parts.next().unwrap().parse().unwrap();
        (a, b)
    }

    #[test]
    fn addition_respects_the_level_cap() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let q = generate(Operator::Addition, 2, &mut rng).unwrap();
            let (a, b) = operands(q.prompt());
            assert!(a <= 20 && b <= 20, "{}", q.prompt());
        }
    }

    #[test]
    fn subtraction_never_goes_negative() {
        let mut rng = StdRng::seed_from_u64(4);
        for level in 1..=5 {
            for _ in 0..100 {
                let q = generate(Operator::Subtraction, level, &mut rng).unwrap();
                let (a, b) = operands(q.prompt());
                assert!(b <= a, "{}", q.prompt());
            }
        }
    }

    #[test]
    fn division_is_always_exact() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let q = generate(Operator::Division, 3, &mut rng).unwrap();
            let (a, b) = operands(q.prompt());
            assert!(b >= 1 && a % b == 0, "{}", q.prompt());
        }
    }

    #[test]
    fn answers_match_the_operands() {
        let mut rng = StdRng::seed_from_u64(6);
        let q = generate(Operator::Multiplication, 2, &mut rng).unwrap();
        let (a, b) = operands(q.prompt());
        match q.answer() {
            math_core::model::AnswerKey::Exact(answer) => {
                assert_eq!(answer, &(a * b).to_string());
            }
            math_core::model::AnswerKey::MultiSelect { .. } => panic!("facts are exact-answer"),
        }
    }
}
