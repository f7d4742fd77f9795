use serde::{Deserialize, Serialize};

use super::{
    compliance::compliance_score,
    enums::{answers::Answer, compliance_levels::ComplianceLevel},
};

pub const BRAND_QUESTIONS: [&str; 5] = [
    "Is the Brand logo present?",
    "Is the Contrast of the Brand Logo sufficient?",
    "Is the Relative Size of the Brand's Logo High?",
    "Are all the colors selected in the input present in this Ad?",
    "Are all the Tone of Voices selected as an input present in the Ad?",
];

/// Every brand question is a presence check.
pub const BRAND_EXPECTED_ANSWER: Answer = Answer::Yes;

pub const TONE_OPTIONS: [&str; 9] = [
    "funny",
    "neutral",
    "serious",
    "casual",
    "formal",
    "irrelevant",
    "respectful",
    "enthusiastic",
    "matter of fact",
];

pub fn is_known_tone(tone: &str) -> bool {
    let tone = tone.trim().to_ascii_lowercase();
    TONE_OPTIONS.contains(&tone.as_str())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BrandGuidelines {
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub tones: Vec<String>,
    #[serde(default)]
    pub transcript: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrandQuestionResult {
    pub question_number: u32,
    pub question: String,
    pub expected_answer: Answer,
    pub actual_output: Answer,
    pub matched_score: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrandComplianceReport {
    pub results: Vec<BrandQuestionResult>,
    pub total_questions: usize,
    pub total_matched: usize,
    pub compliance_score: f64,
    pub compliance_level: ComplianceLevel,
}

impl BrandComplianceReport {
    pub fn from_answers(answers: &[Answer]) -> Self {
        let results: Vec<BrandQuestionResult> = BRAND_QUESTIONS
            .iter()
            .zip(answers.iter())
            .enumerate()
            .map(|(index, (question, answer))| BrandQuestionResult {
                question_number: index as u32 + 1,
                question: question.to_string(),
                expected_answer: BRAND_EXPECTED_ANSWER,
                actual_output: *answer,
                matched_score: u8::from(*answer == BRAND_EXPECTED_ANSWER),
            })
            .collect();

        let total_matched = results.iter().filter(|r| r.matched_score == 1).count();
        let score = compliance_score(total_matched, results.len());

        Self {
            total_questions: results.len(),
            total_matched,
            compliance_score: score,
            compliance_level: ComplianceLevel::from_score(score),
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_of_five_is_high() {
        let answers = [Answer::Yes, Answer::Yes, Answer::No, Answer::Yes, Answer::Yes];
        let report = BrandComplianceReport::from_answers(&answers);
        assert_eq!(report.total_matched, 4);
        assert_eq!(report.compliance_score, 80.0);
        assert_eq!(report.compliance_level, ComplianceLevel::High);
        assert_eq!(report.results[2].matched_score, 0);
    }

    #[test]
    fn tones_are_case_insensitive() {
        assert!(is_known_tone("Matter of Fact"));
        assert!(!is_known_tone("sarcastic"));
    }
}
