use std::fmt::Write as _;

use crate::domain::value_objects::{
    brand_compliance::{BRAND_QUESTIONS, BrandGuidelines},
    enums::platforms::Platform,
    guidelines::Guideline,
};

const NO_DESCRIPTION: &str = "No description provided";

fn numbered_guidelines(guidelines: &[Guideline]) -> String {
    guidelines
        .iter()
        .map(|g| format!("{}. {}", g.number, g.text))
        .collect::<Vec<_>>()
        .join("\n")
}

fn description_or_default(ad_description: &str) -> &str {
    if ad_description.trim().is_empty() {
        NO_DESCRIPTION
    } else {
        ad_description
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

const LOGO_WINDOW_NOTE: &str = "IMPORTANT: Reference logo image(s) are attached after the frames. \
When checking logo or brand visibility, compare frames inside the opening window \
(0-3 seconds for Instagram/TikTok, 0-5 seconds for YouTube/Google Ads) against these logos.";

/// Prompt for one batch of video frames checked against a platform's guidelines.
pub fn batch_compliance_prompt(
    platform: Platform,
    guidelines: &[Guideline],
    frame_timestamps: &[f64],
    ad_description: &str,
    has_logos: bool,
) -> String {
    let mut frames = String::new();
    for (index, timestamp) in frame_timestamps.iter().enumerate() {
        let _ = writeln!(frames, "Frame {}: at {:.1} seconds", index + 1, timestamp);
    }

    format!(
        "You are a video ad compliance expert. Analyze these {count} frames as one advertisement \
for {platform} advertising compliance.

Frames to analyze:
{frames}
Ad Description: {description}
Has Logo Inputs: {has_logos}
{logo_note}

Treat the frames as parts of a single advertisement and reason about the ad as a whole.

Check this advertisement against these {platform} guidelines:
{guidelines}

Respond with ONLY a valid JSON array, one entry per frame and guideline:
[
  {{\"frame\": 1, \"guideline_number\": 1, \"guideline\": \"exact guideline text\", \"actual_output\": \"Yes\", \"reason\": \"brief explanation\"}}
]

Rules:
1. \"actual_output\" MUST be \"Yes\" or \"No\". Never answer \"cannot determine\".
2. Include the \"frame\" number in every entry.
3. Start reasons with \"The ad...\" and describe the ad's content, not the frame.
4. Only flag restricted goods (tobacco, alcohol, drugs, gambling) when they are clearly visible.
5. Only flag clear, obvious violations.",
        count = frame_timestamps.len(),
        platform = platform,
        frames = frames,
        description = description_or_default(ad_description),
        has_logos = yes_no(has_logos),
        logo_note = if has_logos { LOGO_WINDOW_NOTE } else { "" },
        guidelines = numbered_guidelines(guidelines),
    )
}

/// Prompt for a still image checked against a platform's guidelines.
pub fn image_compliance_prompt(
    platform: Platform,
    guidelines: &[Guideline],
    ad_description: &str,
    logo_count: usize,
) -> String {
    let logo_note = if logo_count > 0 {
        format!(
            "IMPORTANT: {logo_count} reference logo image(s) are attached. Compare the ad \
against them to decide whether the brand logo is present and visible."
        )
    } else {
        String::new()
    };

    format!(
        "You are an ad compliance expert. Analyze this image advertisement for {platform} \
advertising compliance.

Ad Description: {description}
Has Logo Inputs: {has_logos}
{logo_note}

Check this advertisement against these {platform} guidelines:
{guidelines}

Respond with ONLY a valid JSON array:
[
  {{\"guideline_number\": 1, \"guideline\": \"exact guideline text\", \"actual_output\": \"Yes\", \"reason\": \"brief explanation\"}}
]

\"actual_output\" MUST be \"Yes\" or \"No\". Start reasons with \"The ad...\".",
        platform = platform,
        description = description_or_default(ad_description),
        has_logos = yes_no(logo_count > 0),
        logo_note = logo_note,
        guidelines = numbered_guidelines(guidelines),
    )
}

pub fn brand_compliance_prompt(logo_count: usize, brand: &BrandGuidelines) -> String {
    let questions = BRAND_QUESTIONS
        .iter()
        .enumerate()
        .map(|(index, question)| format!("Q{}: {}", index + 1, question))
        .collect::<Vec<_>>()
        .join("\n");

    let join_or_none = |items: &[String]| {
        if items.is_empty() {
            "None provided".to_string()
        } else {
            items.join(", ")
        }
    };

    let transcript = match brand.transcript.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => format!("\nAudio transcript of the ad:\n{text}\n"),
        _ => String::new(),
    };

    format!(
        "You are a brand compliance reviewer. The first {logo_count} image(s) after the ad are \
the brand's reference logos.

Brand colors to look for: {colors}
Tones of voice to look for: {tones}
{transcript}
Answer each question with Yes or No only, one per line, in the form \"Q1: Yes\".

{questions}",
        logo_count = logo_count,
        colors = join_or_none(&brand.colors),
        tones = join_or_none(&brand.tones),
        transcript = transcript,
        questions = questions,
    )
}

pub fn message_intent_prompt(ad_description: &str, user_ad_type: &str) -> String {
    format!(
        "You are a world-class advertising analyst reviewing a single advertisement.

Tasks:
1. Summarize the core message of the ad in 2-3 sentences.
2. Describe the emotional tone (funny, serious, dramatic, inspiring, urgent, ...).
3. Score from 15 to 95 how fully the ad description below is carried by the ad's messaging:
   80-95 completely, 60-79 partially, 30-59 poorly, 15-29 not at all. Prefer specific values such as 82 or 47.
4. Classify the ad as exactly one of Awareness, Consideration or Conversion.
5. Score from 15 to 95 how effective the ad is within that category, and explain why.
6. Suggest, in at most 2 sentences, how to improve the ad within its category.

Ad description: {description}

Return only JSON in this shape:
{{
  \"message_intent\": {{
    \"intent_compliance_score\": <int>,
    \"core_message_summary\": <string>,
    \"emotional_tone\": <string>
  }},
  \"funnel_compatibility\": {{
    \"effectiveness_score\": <int>,
    \"user_selected_type\": \"{user_ad_type}\",
    \"classification\": \"Awareness\" | \"Consideration\" | \"Conversion\",
    \"match_with_user_selection\": \"Yes\" | \"No\",
    \"reasoning\": <string>,
    \"improvement_suggestion\": <string>
  }}
}}",
        description = description_or_default(ad_description),
        user_ad_type = user_ad_type,
    )
}

pub const PURCHASE_INTENT_PROMPT: &str = "Analyze this advertisement and evaluate its purchase intent.

Provide:
1. Resonating Impact: how the ad may emotionally or cognitively affect viewers.
2. Purchase Intent Scores: score each metric out of 5 with a reason in parentheses.

Response format:
Resonating Impact:
[description]

Purchase Intent Scores:
- Message clarity - X/5 (reason)
- Emotional appeal - X/5 (reason)
- Relevance - X/5 (reason)
- Visual or verbal CTA strength - X/5 (reason)
- Use of psychological or persuasive triggers - X/5 (reason)
";
