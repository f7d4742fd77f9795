use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FunnelStage {
    Awareness,
    Consideration,
    Conversion,
}

impl FunnelStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FunnelStage::Awareness => "Awareness",
            FunnelStage::Consideration => "Consideration",
            FunnelStage::Conversion => "Conversion",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "awareness" => Some(FunnelStage::Awareness),
            "consideration" => Some(FunnelStage::Consideration),
            "conversion" => Some(FunnelStage::Conversion),
            _ => None,
        }
    }
}

impl Display for FunnelStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
