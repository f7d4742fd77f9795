use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::value_objects::{
    compliance::GuidelineResult,
    enums::answers::Answer,
    guidelines::Guideline,
    message_intent::MessageIntentReport,
};

pub const GUIDELINE_NOT_FOUND_REASON: &str =
    "Guideline not found in AI response - defaulting to No";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResponseParseError {
    #[error("no JSON array found in model response")]
    NoJsonArray,
    #[error("no JSON object found in model response")]
    NoJsonObject,
    #[error("malformed JSON in model response: {0}")]
    InvalidJson(String),
    #[error("expected {expected} answers, found {found}")]
    AnswerCount { expected: usize, found: usize },
}

fn greedy_array_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\[.*\]").expect("static regex"))
}

fn fenced_array_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```json\s*(\[.*?\])\s*```").expect("static regex"))
}

/// Pulls the first JSON array out of free text. Tries a balanced bracket
/// scan, then a greedy `[...]` match, then a fenced json block.
pub fn extract_json_array(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut start = None;

    for (index, ch) in text.char_indices() {
        match ch {
            '[' => {
                if depth == 0 {
                    start = Some(index);
                }
                depth += 1;
            }
            ']' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(start) = start {
                        return Some(&text[start..=index]);
                    }
                }
            }
            _ => {}
        }
    }

    if let Some(found) = greedy_array_regex().find(text) {
        return Some(found.as_str());
    }

    fenced_array_regex()
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|found| found.as_str())
}

fn strip_trailing_comma(content: &str) -> String {
    let trimmed = content.trim();
    if let Some(head) = trimmed.strip_suffix(",]") {
        format!("{head}]")
    } else if let Some(head) = trimmed.strip_suffix(',') {
        head.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Decodes an array of entries. A truncated reply is salvaged by keeping the
/// longest line prefix that closes as a valid array.
pub fn decode_entries(content: &str) -> Result<Vec<Value>, ResponseParseError> {
    let cleaned = strip_trailing_comma(content);

    let original_err = match serde_json::from_str::<Vec<Value>>(&cleaned) {
        Ok(entries) => return Ok(entries),
        Err(err) => err,
    };

    let lines: Vec<&str> = cleaned.lines().collect();
    for end in (1..=lines.len()).rev() {
        let partial = lines[..end].join("\n");
        let trimmed = partial.trim_end();
        let candidate = if trimmed.ends_with('}') {
            format!("{trimmed}\n]")
        } else if trimmed.ends_with(']') {
            trimmed.to_string()
        } else {
            continue;
        };

        if let Ok(entries) = serde_json::from_str::<Vec<Value>>(&candidate) {
            debug!(
                recovered = entries.len(),
                "response_parser: recovered truncated array"
            );
            return Ok(entries);
        }
    }

    Err(ResponseParseError::InvalidJson(original_err.to_string()))
}

fn value_as_u32(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn value_as_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str)
}

fn entry_result(entry: &Value, guideline: &Guideline) -> GuidelineResult {
    let actual = Answer::normalize(value_as_str(entry.get("actual_output")));
    let reason = value_as_str(entry.get("reason")).unwrap_or_default();
    GuidelineResult::new(guideline, actual, reason)
}

/// Turns a batched reply into per-frame results, flattened frame by frame in
/// the order frames first appear. Entries naming a frame outside the batch or
/// a guideline outside `guidelines` are dropped.
pub fn parse_batch_response(
    text: &str,
    frame_count: usize,
    guidelines: &[Guideline],
) -> Result<Vec<GuidelineResult>, ResponseParseError> {
    let content = extract_json_array(text).ok_or(ResponseParseError::NoJsonArray)?;
    let entries = decode_entries(content)?;

    let mut frames: Vec<(u32, Vec<&Value>)> = Vec::new();
    for entry in &entries {
        let frame = value_as_u32(entry.get("frame")).unwrap_or(1);
        match frames.iter_mut().find(|(number, _)| *number == frame) {
            Some((_, grouped)) => grouped.push(entry),
            None => frames.push((frame, vec![entry])),
        }
    }

    let mut results = Vec::new();
    for (frame, grouped) in frames {
        if frame == 0 || frame as usize > frame_count {
            warn!(frame, frame_count, "response_parser: dropping entries for unknown frame");
            continue;
        }

        for entry in grouped {
            let number = value_as_u32(entry.get("guideline_number")).unwrap_or(1);
            if let Some(guideline) = guidelines.iter().find(|g| g.number == number) {
                results.push(entry_result(entry, guideline));
            }
        }
    }

    Ok(results)
}

/// Parses a single-image reply. Every guideline gets exactly one result; those
/// the model skipped default to `No`.
pub fn parse_image_response(text: &str, guidelines: &[Guideline]) -> Vec<GuidelineResult> {
    let entries = match extract_json_array(text)
        .ok_or(ResponseParseError::NoJsonArray)
        .and_then(decode_entries)
    {
        Ok(entries) => entries,
        Err(err) => {
            warn!(error = %err, "response_parser: image response unreadable");
            let reason = format!("Error parsing AI response: {err}");
            return guidelines
                .iter()
                .map(|guideline| GuidelineResult::new(guideline, Answer::No, reason.clone()))
                .collect();
        }
    };

    guidelines
        .iter()
        .map(|guideline| {
            entries
                .iter()
                .find(|entry| value_as_u32(entry.get("guideline_number")) == Some(guideline.number))
                .map(|entry| entry_result(entry, guideline))
                .unwrap_or_else(|| {
                    GuidelineResult::new(guideline, Answer::No, GUIDELINE_NOT_FOUND_REASON)
                })
        })
        .collect()
}

/// Reads `Qn: Yes|No` lines. Exactly `expected` answers are required.
pub fn parse_question_answers(
    text: &str,
    expected: usize,
) -> Result<Vec<Answer>, ResponseParseError> {
    let answers: Vec<Answer> = text
        .lines()
        .map(|line| line.trim().trim_start_matches(['*', '-', ' ']))
        .filter(|line| line.starts_with('Q'))
        .filter_map(|line| line.split_once(':'))
        .filter_map(|(_, answer)| {
            Answer::from_str(answer.trim().trim_matches(['*', '.', ' ']))
        })
        .collect();

    if answers.len() != expected {
        return Err(ResponseParseError::AnswerCount {
            expected,
            found: answers.len(),
        });
    }
    Ok(answers)
}

/// Decodes the object spanning the first `{` to the last `}`.
pub fn parse_message_intent(text: &str) -> Result<MessageIntentReport, ResponseParseError> {
    let start = text.find('{').ok_or(ResponseParseError::NoJsonObject)?;
    let end = text.rfind('}').ok_or(ResponseParseError::NoJsonObject)?;
    if end < start {
        return Err(ResponseParseError::NoJsonObject);
    }

    serde_json::from_str(&text[start..=end])
        .map_err(|err| ResponseParseError::InvalidJson(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{
        compliance::DEFAULT_FAIL_REASON,
        enums::{media_kinds::MediaKind, platforms::Platform},
        guidelines::{GuidelineFilter, applicable_guidelines, guidelines_for},
    };

    #[test]
    fn bracket_scan_ignores_surrounding_prose() {
        let text = "Sure! Here you go:\n[{\"a\": [1, 2]}, {\"b\": 3}]\nHope this helps [really].";
        assert_eq!(extract_json_array(text), Some("[{\"a\": [1, 2]}, {\"b\": 3}]"));
    }

    #[test]
    fn unbalanced_text_falls_back_to_greedy_match() {
        let text = "[[{\"frame\": 1}] trailing";
        assert_eq!(extract_json_array(text), Some("[[{\"frame\": 1}]"));
        assert_eq!(extract_json_array("no array here"), None);
    }

    #[test]
    fn trailing_commas_are_stripped() {
        assert_eq!(decode_entries("[{\"a\": 1},]").unwrap().len(), 1);
    }

    #[test]
    fn truncated_array_keeps_complete_entries() {
        let truncated = "[\n{\"frame\": 1, \"guideline_number\": 2},\n{\"frame\": 1, \"guideline_number\": 3}\n{\"frame\": 2, \"guid";
        let entries = decode_entries(truncated).unwrap();
        assert!(!entries.is_empty());
        assert_eq!(entries[0]["guideline_number"], 2);
    }

    #[test]
    fn batch_response_maps_frames_and_guidelines() {
        let guidelines = applicable_guidelines(
            Platform::YouTube,
            MediaKind::Video,
            GuidelineFilter::ExcludeLogo,
            true,
        );
        let text = r#"```json
[
  {"frame": 2, "guideline_number": 2, "actual_output": "yes", "reason": "The ad shows a fake claim"},
  {"frame": 1, "guideline_number": 4, "actual_output": "Yes", "reason": ""},
  {"frame": 1, "guideline_number": 1, "actual_output": "Yes", "reason": "logo pass excluded"},
  {"frame": 9, "guideline_number": 2, "actual_output": "No", "reason": "out of batch"},
  {"frame": 1, "guideline_number": 5, "actual_output": "No determination possible"}
]
```"#;

        let results = parse_batch_response(text, 2, &guidelines).unwrap();
        let numbers: Vec<u32> = results.iter().map(|r| r.guideline_number).collect();
        assert_eq!(numbers, vec![2, 4, 5]);

        assert_eq!(results[0].actual_output, Answer::Yes);
        assert_eq!(results[0].matched_score, 0);
        assert_eq!(results[1].reason, "Guideline compliance verified successfully");
        assert_eq!(results[2].actual_output, Answer::No);
        assert_eq!(results[2].matched_score, 1);
    }

    #[test]
    fn batch_response_without_array_is_an_error() {
        let guidelines = guidelines_for(Platform::Facebook);
        assert_eq!(
            parse_batch_response("I could not analyse this ad.", 1, &guidelines),
            Err(ResponseParseError::NoJsonArray)
        );
    }

    #[test]
    fn image_response_defaults_missing_guidelines() {
        let guidelines = applicable_guidelines(
            Platform::Facebook,
            MediaKind::Image,
            GuidelineFilter::All,
            false,
        );
        let text = r#"[{"guideline_number": 2, "actual_output": "Yes", "reason": "Image dominates"}]"#;

        let results = parse_image_response(text, &guidelines);
        assert_eq!(results.len(), 5);
        assert_eq!(results[1].actual_output, Answer::Yes);
        assert_eq!(results[1].matched_score, 1);
        assert_eq!(results[0].reason, GUIDELINE_NOT_FOUND_REASON);
        // guideline 1 expects "No", so the default still matches
        assert_eq!(results[0].matched_score, 1);
        // guideline 5 expects "Yes"
        assert_eq!(results[4].matched_score, 0);
    }

    #[test]
    fn unreadable_image_response_fails_every_guideline() {
        let guidelines = guidelines_for(Platform::Facebook);
        let results = parse_image_response("[not json at all]", &guidelines);
        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|r| r.actual_output == Answer::No));
        assert!(results[0].reason.starts_with("Error parsing AI response"));
        assert_ne!(results[0].reason, DEFAULT_FAIL_REASON);
    }

    #[test]
    fn question_answers_need_exact_count() {
        let text = "Q1: Yes\nQ2: No\n**Q3:** yes.\nQ4: Maybe\nQ5: Yes\nQ6: No";
        assert_eq!(
            parse_question_answers(text, 5).unwrap(),
            vec![Answer::Yes, Answer::No, Answer::Yes, Answer::Yes, Answer::No]
        );

        let err = parse_question_answers("Q1: Yes\nQ2: No", 5).unwrap_err();
        assert_eq!(err, ResponseParseError::AnswerCount { expected: 5, found: 2 });
    }

    #[test]
    fn message_intent_reads_outer_object() {
        let text = r#"Here is the analysis:
{
  "message_intent": {"intent_compliance_score": 82, "core_message_summary": "Fresh coffee", "emotional_tone": "warm"},
  "funnel_compatibility": {"effectiveness_score": 71, "user_selected_type": "x", "classification": "Awareness",
    "match_with_user_selection": "Yes", "reasoning": "brand recall", "improvement_suggestion": "add CTA"}
}
Thanks!"#;

        let report = parse_message_intent(text).unwrap();
        assert_eq!(report.message_intent.intent_compliance_score, 82.0);
        assert_eq!(report.funnel_compatibility.classification, "Awareness");
        assert!(!report.funnel_compatibility.match_with_user_selection);

        assert_eq!(
            parse_message_intent("nothing"),
            Err(ResponseParseError::NoJsonObject)
        );
    }

    #[test]
    fn message_intent_tolerates_fractional_and_quoted_scores() {
        let text = r#"```json
{"message_intent": {"intent_compliance_score": 82.5, "core_message_summary": "s", "emotional_tone": "calm"},
 "funnel_compatibility": {"effectiveness_score": "64", "classification": "Conversion"}}
```"#;

        let report = parse_message_intent(text).unwrap();
        assert_eq!(report.message_intent.intent_compliance_score, 82.5);
        assert_eq!(report.funnel_compatibility.effectiveness_score, 64.0);
    }
}
