use serde::{Deserialize, Deserializer, Serialize};

use super::enums::funnel_stages::FunnelStage;

/// Reads a model score given as an integer, a float or a numeric string,
/// clamped to 0..=100. Anything unreadable counts as 0.
fn lenient_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let score = match value {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(text) => text.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    };
    Ok(score.filter(|s: &f64| s.is_finite()).unwrap_or(0.0).clamp(0.0, 100.0))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MessageIntent {
    #[serde(default, deserialize_with = "lenient_score")]
    pub intent_compliance_score: f64,
    #[serde(default)]
    pub core_message_summary: String,
    #[serde(default)]
    pub emotional_tone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FunnelCompatibility {
    #[serde(default, deserialize_with = "lenient_score")]
    pub effectiveness_score: f64,
    #[serde(default)]
    pub user_selected_type: String,
    #[serde(default)]
    pub classification: String,
    /// Recomputed locally; whatever the model claims is ignored.
    #[serde(default, skip_deserializing)]
    pub match_with_user_selection: bool,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub improvement_suggestion: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MessageIntentReport {
    pub message_intent: MessageIntent,
    pub funnel_compatibility: FunnelCompatibility,
}

impl MessageIntentReport {
    /// Pins the user's own funnel choice onto the report and compares it with
    /// the model's classification.
    pub fn apply_user_selection(&mut self, user_selected_type: &str) {
        let funnel = &mut self.funnel_compatibility;
        funnel.user_selected_type = user_selected_type.to_string();

        let classified = FunnelStage::from_str(&funnel.classification);
        if let Some(stage) = classified {
            funnel.classification = stage.to_string();
        }

        funnel.match_with_user_selection = match (classified, FunnelStage::from_str(user_selected_type)) {
            (Some(classified), Some(selected)) => classified == selected,
            _ => {
                funnel.classification.trim().to_lowercase()
                    == user_selected_type.trim().to_lowercase()
            }
        };
    }
}
