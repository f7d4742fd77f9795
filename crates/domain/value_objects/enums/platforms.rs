use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Platform {
    YouTube,
    Instagram,
    Facebook,
    TikTok,
    #[serde(rename = "Google Ads")]
    GoogleAds,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::YouTube,
        Platform::Instagram,
        Platform::Facebook,
        Platform::TikTok,
        Platform::GoogleAds,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::YouTube => "YouTube",
            Platform::Instagram => "Instagram",
            Platform::Facebook => "Facebook",
            Platform::TikTok => "TikTok",
            Platform::GoogleAds => "Google Ads",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim() {
            "YouTube" => Some(Platform::YouTube),
            "Instagram" => Some(Platform::Instagram),
            "Facebook" => Some(Platform::Facebook),
            "TikTok" => Some(Platform::TikTok),
            "Google Ads" => Some(Platform::GoogleAds),
            _ => None,
        }
    }

    /// Seconds from the start of a video in which the brand logo must show up.
    /// `None` means every frame is eligible.
    pub fn logo_window_secs(&self) -> Option<f64> {
        match self {
            Platform::Instagram | Platform::TikTok => Some(3.0),
            Platform::YouTube | Platform::GoogleAds => Some(5.0),
            Platform::Facebook => None,
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
