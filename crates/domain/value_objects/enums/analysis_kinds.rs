use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    MessageIntent,
    BrandCompliance,
    ContentAnalysis,
    ChannelCompliance,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::MessageIntent => "message_intent",
            AnalysisKind::BrandCompliance => "brand_compliance",
            AnalysisKind::ContentAnalysis => "content_analysis",
            AnalysisKind::ChannelCompliance => "channel_compliance",
        }
    }
}

impl Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
