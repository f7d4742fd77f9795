use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::media_kinds::MediaKind;

/// Which kind of creative a guideline applies to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AdType {
    Video,
    Image,
    Both,
}

impl AdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdType::Video => "Video",
            AdType::Image => "Image",
            AdType::Both => "Both",
        }
    }

    pub fn applies_to(&self, media_kind: MediaKind) -> bool {
        match self {
            AdType::Both => true,
            AdType::Video => media_kind == MediaKind::Video,
            AdType::Image => media_kind == MediaKind::Image,
        }
    }
}

impl Display for AdType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
