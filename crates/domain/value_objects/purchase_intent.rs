use serde::{Deserialize, Serialize};

use super::compliance::round_to;

/// Metric label as written in the model reply, and the key it is reported under.
pub const PURCHASE_INTENT_METRICS: [(&str, &str); 5] = [
    ("Message clarity", "message_clarity"),
    ("Emotional appeal", "emotional_appeal"),
    ("Relevance", "relevance"),
    ("Visual or verbal CTA strength", "cta_strength"),
    (
        "Use of psychological or persuasive triggers",
        "psychological_triggers",
    ),
];

pub const MAX_METRIC_SCORE: u8 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseIntentScore {
    pub metric: String,
    pub score: u8,
    pub percentage: f64,
    pub reason: String,
}

impl PurchaseIntentScore {
    pub fn new(metric: &str, score: u8, reason: String) -> Self {
        let score = score.min(MAX_METRIC_SCORE);
        Self {
            metric: metric.to_string(),
            score,
            percentage: f64::from(score) / f64::from(MAX_METRIC_SCORE) * 100.0,
            reason,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseIntentReport {
    pub resonating_impact: String,
    pub purchase_intent_scores: Vec<PurchaseIntentScore>,
    pub overall_purchase_intent_percentage: f64,
}

impl PurchaseIntentReport {
    pub fn new(resonating_impact: String, purchase_intent_scores: Vec<PurchaseIntentScore>) -> Self {
        let overall = if purchase_intent_scores.is_empty() {
            0.0
        } else {
            let sum: f64 = purchase_intent_scores.iter().map(|s| s.percentage).sum();
            round_to(sum / purchase_intent_scores.len() as f64, 2)
        };

        Self {
            resonating_impact,
            purchase_intent_scores,
            overall_purchase_intent_percentage: overall,
        }
    }
}
