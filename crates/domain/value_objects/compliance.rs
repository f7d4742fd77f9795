use serde::{Deserialize, Serialize};

use super::{
    enums::{
        ad_types::AdType, answers::Answer, guideline_inputs::GuidelineInputs,
        media_kinds::MediaKind, platforms::Platform,
    },
    guidelines::Guideline,
};

pub const DEFAULT_PASS_REASON: &str = "Guideline compliance verified successfully";
pub const DEFAULT_FAIL_REASON: &str = "Guideline compliance check failed";

/// One guideline verdict, either for a single frame or after aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuidelineResult {
    pub guideline_number: u32,
    pub guideline: String,
    pub ad_type: AdType,
    pub inputs: GuidelineInputs,
    pub expected_answer: Answer,
    pub actual_output: Answer,
    pub matched_score: u8,
    pub reason: String,
}

impl GuidelineResult {
    pub fn new(guideline: &Guideline, actual_output: Answer, reason: impl Into<String>) -> Self {
        let matched = actual_output == guideline.expected;
        let reason = reason.into();
        let reason = if reason.trim().is_empty() {
            default_reason(matched).to_string()
        } else {
            reason
        };

        Self {
            guideline_number: guideline.number,
            guideline: guideline.text.to_string(),
            ad_type: guideline.ad_type,
            inputs: guideline.inputs,
            expected_answer: guideline.expected,
            actual_output,
            matched_score: u8::from(matched),
            reason,
        }
    }

    /// Replaces the verdict and keeps `matched_score` consistent with it.
    pub fn override_output(&mut self, actual_output: Answer, reason: impl Into<String>) {
        self.actual_output = actual_output;
        self.matched_score = u8::from(actual_output == self.expected_answer);
        self.reason = reason.into();
    }

    pub fn is_matched(&self) -> bool {
        self.matched_score == 1
    }
}

pub fn default_reason(matched: bool) -> &'static str {
    if matched {
        DEFAULT_PASS_REASON
    } else {
        DEFAULT_FAIL_REASON
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `matched / total * 100` rounded to one decimal, or 0 when nothing was scored.
pub fn compliance_score(matched: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(matched as f64 / total as f64 * 100.0, 1)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrameCounts {
    pub frames_analyzed: usize,
    pub logo_frames_analyzed: usize,
    pub general_frames_analyzed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlatformComplianceReport {
    pub platform: Platform,
    pub guideline_results: Vec<GuidelineResult>,
    pub total_guidelines: usize,
    pub total_matched_scores: usize,
    pub compliance_score: f64,
    pub compliance_percentage: String,
    #[serde(flatten)]
    pub frames: FrameCounts,
}

impl PlatformComplianceReport {
    pub fn new(platform: Platform, guideline_results: Vec<GuidelineResult>, frames: FrameCounts) -> Self {
        let mut report = Self {
            platform,
            guideline_results,
            total_guidelines: 0,
            total_matched_scores: 0,
            compliance_score: 0.0,
            compliance_percentage: String::new(),
            frames,
        };
        report.recompute();
        report
    }

    /// Refreshes totals after `guideline_results` changed.
    pub fn recompute(&mut self) {
        self.total_guidelines = self.guideline_results.len();
        self.total_matched_scores = self
            .guideline_results
            .iter()
            .filter(|result| result.is_matched())
            .count();
        self.compliance_score = compliance_score(self.total_matched_scores, self.total_guidelines);
        self.compliance_percentage = format!("{:.1}%", self.compliance_score);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelComplianceReport {
    pub media_kind: MediaKind,
    pub platforms: Vec<PlatformComplianceReport>,
    pub overall_compliance_score: Option<f64>,
}

impl ChannelComplianceReport {
    pub fn new(media_kind: MediaKind, platforms: Vec<PlatformComplianceReport>) -> Self {
        let overall_compliance_score = if platforms.is_empty() {
            None
        } else {
            let sum: f64 = platforms.iter().map(|p| p.compliance_score).sum();
            Some(round_to(sum / platforms.len() as f64, 1))
        };

        Self {
            media_kind,
            platforms,
            overall_compliance_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::guidelines::guidelines_for;

    #[test]
    fn score_rounds_to_one_decimal() {
        assert_eq!(compliance_score(2, 3), 66.7);
        assert_eq!(compliance_score(1, 3), 33.3);
        assert_eq!(compliance_score(0, 0), 0.0);
        assert_eq!(compliance_score(4, 4), 100.0);
    }

    #[test]
    fn empty_reason_gets_default() {
        let guideline = guidelines_for(Platform::YouTube)[1];
        let result = GuidelineResult::new(&guideline, Answer::No, "  ");
        assert_eq!(result.matched_score, 1);
        assert_eq!(result.reason, DEFAULT_PASS_REASON);

        let result = GuidelineResult::new(&guideline, Answer::Yes, "");
        assert_eq!(result.matched_score, 0);
        assert_eq!(result.reason, DEFAULT_FAIL_REASON);
    }

    #[test]
    fn overall_score_is_mean_of_platforms() {
        let youtube = guidelines_for(Platform::YouTube);
        let passing = PlatformComplianceReport::new(
            Platform::YouTube,
            vec![GuidelineResult::new(&youtube[1], Answer::No, "clean")],
            FrameCounts::default(),
        );
        let failing = PlatformComplianceReport::new(
            Platform::Instagram,
            vec![GuidelineResult::new(&youtube[1], Answer::Yes, "misleading")],
            FrameCounts::default(),
        );

        let report = ChannelComplianceReport::new(MediaKind::Video, vec![passing, failing]);
        assert_eq!(report.overall_compliance_score, Some(50.0));
        assert_eq!(report.platforms[0].compliance_percentage, "100.0%");

        let empty = ChannelComplianceReport::new(MediaKind::Image, Vec::new());
        assert_eq!(empty.overall_compliance_score, None);
    }
}
