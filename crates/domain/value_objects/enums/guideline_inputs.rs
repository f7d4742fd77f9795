use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// What a guideline needs to be evaluated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GuidelineInputs {
    #[serde(rename = "Ad")]
    Ad,
    #[serde(rename = "Logos + Ad")]
    LogosAndAd,
}

impl GuidelineInputs {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuidelineInputs::Ad => "Ad",
            GuidelineInputs::LogosAndAd => "Logos + Ad",
        }
    }

    pub fn needs_logos(&self) -> bool {
        matches!(self, GuidelineInputs::LogosAndAd)
    }
}

impl Display for GuidelineInputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
