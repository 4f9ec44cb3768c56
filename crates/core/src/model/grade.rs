use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// School grade of a learner account, kindergarten through "6 and above".
///
/// Ordering follows the school progression (`K < 1 < … < 6 < 6+`), which is
/// what grade-gated rules compare against.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Grade {
    K,
    First,
    Second,
    Third,
    Fourth,
    Fifth,
    Sixth,
    SixPlus,
}

impl Grade {
    pub const ALL: [Grade; 8] = [
        Grade::K,
        Grade::First,
        Grade::Second,
        Grade::Third,
        Grade::Fourth,
        Grade::Fifth,
        Grade::Sixth,
        Grade::SixPlus,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::K => "K",
            Grade::First => "1",
            Grade::Second => "2",
            Grade::Third => "3",
            Grade::Fourth => "4",
            Grade::Fifth => "5",
            Grade::Sixth => "6",
            Grade::SixPlus => "6+",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unrecognized grade: {0}")]
pub struct ParseGradeError(pub String);

impl FromStr for Grade {
    type Err = ParseGradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "K" | "k" => Ok(Grade::K),
            "1" => Ok(Grade::First),
            "2" => Ok(Grade::Second),
            "3" => Ok(Grade::Third),
            "4" => Ok(Grade::Fourth),
            "5" => Ok(Grade::Fifth),
            "6" => Ok(Grade::Sixth),
            "6+" => Ok(Grade::SixPlus),
            other => Err(ParseGradeError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grades_order_by_school_year() {
        assert!(Grade::K < Grade::First);
        assert!(Grade::Fifth < Grade::Sixth);
        assert!(Grade::Sixth < Grade::SixPlus);
    }

    #[test]
    fn grade_round_trips_through_strings() {
        for grade in Grade::ALL {
            let parsed: Grade = grade.as_str().parse().unwrap();
            assert_eq!(parsed, grade);
        }
    }

    #[test]
    fn lowercase_k_is_accepted() {
        assert_eq!("k".parse::<Grade>().unwrap(), Grade::K);
    }

    #[test]
    fn unknown_grade_is_rejected() {
        assert!("7".parse::<Grade>().is_err());
        assert!("first".parse::<Grade>().is_err());
    }
}
