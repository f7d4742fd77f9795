use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A Yes/No verdict returned by the model for a single guideline or question.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Answer::Yes => "Yes",
            Answer::No => "No",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yes" => Some(Answer::Yes),
            "no" => Some(Answer::No),
            _ => None,
        }
    }

    /// Normalises whatever the model wrote into a verdict. Hedged or unknown
    /// answers count as `No`.
    pub fn normalize(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Answer::No;
        };

        let lowered = raw.trim().to_ascii_lowercase();
        if lowered.contains("no determination") || lowered.contains("cannot determine") {
            return Answer::No;
        }

        Answer::from_str(&lowered).unwrap_or(Answer::No)
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, Answer::Yes)
    }
}

impl Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(Answer::from_str(" YES "), Some(Answer::Yes));
        assert_eq!(Answer::from_str("no"), Some(Answer::No));
        assert_eq!(Answer::from_str("maybe"), None);
    }

    #[test]
    fn hedged_answers_normalize_to_no() {
        assert_eq!(Answer::normalize(Some("No determination possible")), Answer::No);
        assert_eq!(Answer::normalize(Some("I cannot determine this")), Answer::No);
        assert_eq!(Answer::normalize(Some("Partially")), Answer::No);
        assert_eq!(Answer::normalize(None), Answer::No);
        assert_eq!(Answer::normalize(Some("Yes")), Answer::Yes);
    }
}
