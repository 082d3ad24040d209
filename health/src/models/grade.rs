use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative verdict attached to every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Bad,
    Ok,
    Good,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Bad => "bad",
            Grade::Ok => "ok",
            Grade::Good => "good",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a threshold table: `grade` applies when `applies` holds.
pub struct Rule<P> {
    pub grade: Grade,
    pub applies: fn(&P) -> bool,
}

/// Evaluates `rules` top-down and returns the first matching grade, or
/// `otherwise` when none match.
pub fn first_match<P>(payload: &P, rules: &[Rule<P>], otherwise: Grade) -> Grade {
    rules
        .iter()
        .find(|rule| (rule.applies)(payload))
        .map(|rule| rule.grade)
        .unwrap_or(otherwise)
}
