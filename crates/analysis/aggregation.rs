use crate::domain::value_objects::{
    compliance::{GuidelineResult, default_reason},
    enums::answers::Answer,
};

pub const FALLBACK_REASON: &str = "Guideline met successfully";
pub const NO_QUALIFYING_FRAME_REASON: &str =
    "No frame within analyzed window showed the required criterion";
pub const VIOLATING_FRAME_REASON: &str = "Found at least one violating frame";

/// First non-empty reason that is not about a black frame, else the first
/// entry's own reason.
fn best_reason(entries: &[&GuidelineResult]) -> String {
    entries
        .iter()
        .map(|entry| entry.reason.trim())
        .find(|reason| !reason.is_empty() && !reason.to_lowercase().contains("black"))
        .or_else(|| entries.first().map(|entry| entry.reason.trim()))
        .filter(|reason| !reason.is_empty())
        .unwrap_or(FALLBACK_REASON)
        .to_string()
}

/// Collapses per-frame verdicts into one result per guideline.
///
/// A guideline expecting `Yes` passes when any frame says `Yes`. A guideline
/// expecting `No` stays `No` only when every frame says `No`. Output keeps the
/// order in which each guideline first appears.
pub fn aggregate_guideline_results(results: &[GuidelineResult]) -> Vec<GuidelineResult> {
    let mut groups: Vec<(u32, Vec<&GuidelineResult>)> = Vec::new();
    for result in results {
        match groups
            .iter_mut()
            .find(|(number, _)| *number == result.guideline_number)
        {
            Some((_, entries)) => entries.push(result),
            None => groups.push((result.guideline_number, vec![result])),
        }
    }

    groups
        .into_iter()
        .map(|(_, entries)| aggregate_group(&entries))
        .collect()
}

fn aggregate_group(entries: &[&GuidelineResult]) -> GuidelineResult {
    let first = entries[0];
    let expected = first.expected_answer;

    let (actual, reason) = match expected {
        Answer::Yes => {
            let yes_frames: Vec<&GuidelineResult> = entries
                .iter()
                .copied()
                .filter(|entry| entry.actual_output.is_yes())
                .collect();
            if yes_frames.is_empty() {
                (Answer::No, NO_QUALIFYING_FRAME_REASON.to_string())
            } else {
                (Answer::Yes, best_reason(&yes_frames))
            }
        }
        Answer::No => {
            match entries.iter().find(|entry| entry.actual_output.is_yes()) {
                Some(violation) => {
                    let reason = violation.reason.trim();
                    let reason = if reason.is_empty() {
                        VIOLATING_FRAME_REASON.to_string()
                    } else {
                        reason.to_string()
                    };
                    (Answer::Yes, reason)
                }
                None => (Answer::No, best_reason(entries)),
            }
        }
    };

    let matched = actual == expected;
    let reason = if reason.is_empty() {
        default_reason(matched).to_string()
    } else {
        reason
    };

    GuidelineResult {
        guideline_number: first.guideline_number,
        guideline: first.guideline.clone(),
        ad_type: first.ad_type,
        inputs: first.inputs,
        expected_answer: expected,
        actual_output: actual,
        matched_score: u8::from(matched),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{
        compliance::compliance_score,
        enums::platforms::Platform,
        guidelines::{Guideline, guidelines_for},
    };

    fn youtube(number: u32) -> Guideline {
        guidelines_for(Platform::YouTube)[number as usize - 1]
    }

    fn frame(guideline: &Guideline, answer: Answer, reason: &str) -> GuidelineResult {
        GuidelineResult::new(guideline, answer, reason)
    }

    #[test]
    fn presence_check_passes_on_any_yes() {
        // guideline 4 expects "Yes"
        let inclusive = youtube(4);
        let results = vec![
            frame(&inclusive, Answer::No, "The ad is a black frame"),
            frame(&inclusive, Answer::Yes, "The ad opens on a black screen"),
            frame(&inclusive, Answer::Yes, "The ad uses inclusive imagery"),
        ];

        let aggregated = aggregate_guideline_results(&results);
        assert_eq!(aggregated.len(), 1);
        assert_eq!(aggregated[0].actual_output, Answer::Yes);
        assert_eq!(aggregated[0].matched_score, 1);
        assert_eq!(aggregated[0].reason, "The ad uses inclusive imagery");
    }

    #[test]
    fn presence_check_fails_when_no_frame_says_yes() {
        let inclusive = youtube(4);
        let results = vec![
            frame(&inclusive, Answer::No, "a"),
            frame(&inclusive, Answer::No, "b"),
        ];

        let aggregated = aggregate_guideline_results(&results);
        assert_eq!(aggregated[0].actual_output, Answer::No);
        assert_eq!(aggregated[0].matched_score, 0);
        assert_eq!(aggregated[0].reason, NO_QUALIFYING_FRAME_REASON);
    }

    #[test]
    fn absence_check_fails_on_first_violation() {
        // guideline 5 expects "No"
        let shocking = youtube(5);
        let results = vec![
            frame(&shocking, Answer::No, "The ad is calm"),
            frame(&shocking, Answer::Yes, "The ad shows a crash scene"),
            frame(&shocking, Answer::Yes, "The ad shows blood"),
        ];

        let aggregated = aggregate_guideline_results(&results);
        assert_eq!(aggregated[0].actual_output, Answer::Yes);
        assert_eq!(aggregated[0].matched_score, 0);
        assert_eq!(aggregated[0].reason, "The ad shows a crash scene");
    }

    #[test]
    fn absence_check_passes_only_when_all_frames_say_no() {
        let shocking = youtube(5);
        let results = vec![
            frame(&shocking, Answer::No, "The ad fades from black"),
            frame(&shocking, Answer::No, "The ad is calm"),
        ];

        let aggregated = aggregate_guideline_results(&results);
        assert_eq!(aggregated[0].actual_output, Answer::No);
        assert_eq!(aggregated[0].matched_score, 1);
        assert_eq!(aggregated[0].reason, "The ad is calm");
    }

    #[test]
    fn only_black_frame_reasons_fall_back_to_first_entry() {
        let shocking = youtube(5);
        let results = vec![
            frame(&shocking, Answer::No, "Black frame"),
            frame(&shocking, Answer::No, "Another black frame"),
        ];

        let aggregated = aggregate_guideline_results(&results);
        assert_eq!(aggregated[0].reason, "Black frame");
    }

    #[test]
    fn groups_keep_first_seen_order_and_score() {
        let misleading = youtube(2);
        let restricted = youtube(3);
        let inclusive = youtube(4);
        let results = vec![
            frame(&restricted, Answer::No, "clean"),
            frame(&misleading, Answer::Yes, "fake discount"),
            frame(&inclusive, Answer::No, "neutral"),
            frame(&restricted, Answer::No, "still clean"),
            frame(&inclusive, Answer::Yes, "diverse cast"),
        ];

        let aggregated = aggregate_guideline_results(&results);
        let numbers: Vec<u32> = aggregated.iter().map(|r| r.guideline_number).collect();
        assert_eq!(numbers, vec![3, 2, 4]);

        let matched = aggregated.iter().filter(|r| r.is_matched()).count();
        assert_eq!(matched, 2);
        assert_eq!(compliance_score(matched, aggregated.len()), 66.7);
    }

    #[test]
    fn empty_input_aggregates_to_nothing() {
        assert!(aggregate_guideline_results(&[]).is_empty());
        assert_eq!(compliance_score(0, 0), 0.0);
    }

    #[test]
    fn every_answer_combination_follows_the_presence_and_absence_rules() {
        let inclusive = youtube(4);
        let shocking = youtube(5);

        for frames in 1..=4u32 {
            for mask in 0..(1u32 << frames) {
                let answers: Vec<Answer> = (0..frames)
                    .map(|i| if mask & (1 << i) != 0 { Answer::Yes } else { Answer::No })
                    .collect();
                let any_yes = answers.iter().any(|a| a.is_yes());

                let results: Vec<GuidelineResult> = answers
                    .iter()
                    .flat_map(|answer| {
                        [
                            frame(&inclusive, *answer, "seen"),
                            frame(&shocking, *answer, "seen"),
                        ]
                    })
                    .collect();
                let aggregated = aggregate_guideline_results(&results);
                assert_eq!(aggregated.len(), 2, "answers: {answers:?}");

                let presence = &aggregated[0];
                assert_eq!(presence.expected_answer, Answer::Yes);
                assert_eq!(presence.actual_output.is_yes(), any_yes, "answers: {answers:?}");
                assert_eq!(presence.matched_score, u8::from(any_yes));

                let absence = &aggregated[1];
                assert_eq!(absence.expected_answer, Answer::No);
                assert_eq!(absence.actual_output == Answer::No, !any_yes, "answers: {answers:?}");
                assert_eq!(absence.matched_score, u8::from(!any_yes));

                for result in &aggregated {
                    assert_eq!(
                        result.is_matched(),
                        result.actual_output == result.expected_answer
                    );
                    assert!(!result.reason.is_empty());
                }

                let matched = aggregated.iter().filter(|r| r.is_matched()).count();
                // exactly one of the two rules holds for any answer set
                assert_eq!(matched, 1);
                let score = compliance_score(matched, aggregated.len());
                assert!((0.0..=100.0).contains(&score));
                assert_eq!(score, 50.0);
            }
        }
    }
}
