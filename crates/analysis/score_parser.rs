use std::sync::OnceLock;

use regex::Regex;

use crate::domain::value_objects::purchase_intent::{
    PURCHASE_INTENT_METRICS, PurchaseIntentReport, PurchaseIntentScore,
};

const IMPACT_HEADER: &str = "Resonating Impact:";
const SCORE_HEADERS: [&str; 3] = [
    "Purchase Intent Scores:",
    "Purchase intent Score:",
    "Purchase Intent Score:",
];
const SECTION_END_MARKERS: [&str; 3] = [IMPACT_HEADER, "\n\n", "---"];
const NO_REASON: &str = "No specific reason provided";

fn score_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)/5").expect("static regex"))
}

fn trailing_text_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+/5\s*[-:]?\s*(.+)").expect("static regex"))
}

fn leading_score_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-:]\s*\d+/5\s*[-:]?\s*").expect("static regex"))
}

fn resonating_impact(text: &str) -> String {
    let Some(found) = text.find(IMPACT_HEADER) else {
        return String::new();
    };
    let start = found + IMPACT_HEADER.len();
    let end = text[start..]
        .find(SCORE_HEADERS[0])
        .or_else(|| text[start..].find(SCORE_HEADERS[1]))
        .map(|offset| start + offset);

    match end {
        Some(end) => text[start..end].trim().to_string(),
        None => String::new(),
    }
}

fn scores_section(text: &str) -> Option<&str> {
    let (header_at, header) = SCORE_HEADERS
        .iter()
        .find_map(|header| text.find(header).map(|at| (at, *header)))?;
    let start = header_at + header.len();

    let end = SECTION_END_MARKERS
        .iter()
        .filter_map(|marker| text[start..].find(marker))
        .min()
        .map(|offset| start + offset)
        .unwrap_or(text.len());

    Some(text[start..end].trim())
}

/// Text inside the last balanced pair of parentheses on the line.
fn last_parenthesised(line: &str) -> Option<&str> {
    let mut stack = Vec::new();
    let mut last = None;

    for (index, ch) in line.char_indices() {
        match ch {
            '(' => stack.push(index),
            ')' => {
                if let Some(open) = stack.pop() {
                    last = Some((open, index));
                }
            }
            _ => {}
        }
    }

    last.map(|(open, close)| line[open + 1..close].trim())
        .filter(|reason| !reason.is_empty())
}

fn metric_reason(line: &str, label: &str) -> String {
    if let Some(reason) = last_parenthesised(line) {
        return reason.to_string();
    }

    if let Some(captures) = trailing_text_regex().captures(line) {
        let reason = captures[1].trim();
        let reason = reason
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .unwrap_or(reason)
            .trim();
        if !reason.is_empty() {
            return reason.to_string();
        }
    }

    let lowered = line.to_lowercase();
    if let Some(at) = lowered.find(&label.to_lowercase()) {
        let remaining = line.get(at + label.len()..).unwrap_or_default().trim();
        let remaining = leading_score_regex().replace(remaining, "");
        let remaining = remaining.trim();
        if remaining.len() > 3 {
            return remaining.to_string();
        }
    }

    String::new()
}

/// Reads the purchase intent reply: an impact description followed by one
/// `- Metric - N/5 (reason)` line per metric.
pub fn parse_purchase_intent(text: &str) -> PurchaseIntentReport {
    let mut scores: Vec<PurchaseIntentScore> = Vec::new();

    if let Some(section) = scores_section(text) {
        for line in section.lines().map(str::trim) {
            if line.is_empty() || !(line.contains('-') || line.contains('•')) {
                continue;
            }

            let lowered = line.to_lowercase();
            let Some((label, key)) = PURCHASE_INTENT_METRICS
                .iter()
                .find(|(label, _)| lowered.contains(&label.to_lowercase()))
            else {
                continue;
            };

            let Some(score) = score_regex()
                .captures(line)
                .and_then(|captures| captures[1].parse::<u8>().ok())
            else {
                continue;
            };

            let reason = metric_reason(line, label);
            let reason = if reason.is_empty() {
                NO_REASON.to_string()
            } else {
                reason
            };
            let entry = PurchaseIntentScore::new(key, score, reason);
            // a repeated metric overwrites the earlier line in place
            match scores.iter_mut().find(|existing| existing.metric == entry.metric) {
                Some(existing) => *existing = entry,
                None => scores.push(entry),
            }
        }
    }

    PurchaseIntentReport::new(resonating_impact(text), scores)
}
