use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::analysis_kinds::AnalysisKind;

/// A sellable capability attached to a plan selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    BrandCompliance,
    MessagingIntent,
    FunnelCompatibility,
    ChannelCompliance,
    ResonanceIndex,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::BrandCompliance => "brand_compliance",
            Feature::MessagingIntent => "messaging_intent",
            Feature::FunnelCompatibility => "funnel_compatibility",
            Feature::ChannelCompliance => "channel_compliance",
            Feature::ResonanceIndex => "resonance_index",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim() {
            "brand_compliance" => Some(Feature::BrandCompliance),
            "messaging_intent" => Some(Feature::MessagingIntent),
            "funnel_compatibility" => Some(Feature::FunnelCompatibility),
            "channel_compliance" => Some(Feature::ChannelCompliance),
            "resonance_index" => Some(Feature::ResonanceIndex),
            _ => None,
        }
    }

    /// The analysis that produces this feature's output.
    pub fn analysis_kind(&self) -> AnalysisKind {
        match self {
            Feature::BrandCompliance => AnalysisKind::BrandCompliance,
            Feature::MessagingIntent | Feature::FunnelCompatibility => AnalysisKind::MessageIntent,
            Feature::ChannelCompliance => AnalysisKind::ChannelCompliance,
            Feature::ResonanceIndex => AnalysisKind::ContentAnalysis,
        }
    }
}

impl Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
