use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::plans::PlanConfig;

use super::features::Feature;

const BASE_FEATURES: [Feature; 4] = [
    Feature::BrandCompliance,
    Feature::MessagingIntent,
    Feature::FunnelCompatibility,
    Feature::ChannelCompliance,
];

const FULL_FEATURES: [Feature; 5] = [
    Feature::BrandCompliance,
    Feature::MessagingIntent,
    Feature::FunnelCompatibility,
    Feature::ChannelCompliance,
    Feature::ResonanceIndex,
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Lite,
    Plus,
    Pro,
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Lite => "lite",
            PlanTier::Plus => "plus",
            PlanTier::Pro => "pro",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lite" => Some(PlanTier::Lite),
            "plus" => Some(PlanTier::Plus),
            "pro" => Some(PlanTier::Pro),
            _ => None,
        }
    }

    /// Position in the upgrade hierarchy. Upgrades must strictly increase it.
    pub fn rank(&self) -> u8 {
        match self {
            PlanTier::Lite => 1,
            PlanTier::Plus => 2,
            PlanTier::Pro => 3,
        }
    }

    pub fn config(&self) -> PlanConfig {
        match self {
            PlanTier::Lite => PlanConfig {
                duration_days: 90,
                total_ads: 12,
                max_ads_per_month: 4,
                price: 50,
                default_features: &BASE_FEATURES,
            },
            PlanTier::Plus => PlanConfig {
                duration_days: 180,
                total_ads: 30,
                max_ads_per_month: 5,
                price: 100,
                default_features: &FULL_FEATURES,
            },
            PlanTier::Pro => PlanConfig {
                duration_days: 365,
                total_ads: 132,
                max_ads_per_month: 11,
                price: 400,
                default_features: &FULL_FEATURES,
            },
        }
    }
}

impl Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
