use serde::Serialize;

use super::enums::{features::Feature, plan_tiers::PlanTier};

/// Static allotments for a plan tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanConfig {
    pub duration_days: i64,
    pub total_ads: i32,
    pub max_ads_per_month: i32,
    pub price: i32,
    pub default_features: &'static [Feature],
}

impl PlanConfig {
    pub fn default_features(&self) -> Vec<Feature> {
        self.default_features.to_vec()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlanDto {
    pub plan: PlanTier,
    pub rank: u8,
    pub duration_days: i64,
    pub total_ads: i32,
    pub max_ads_per_month: i32,
    pub price: i32,
    pub features: Vec<Feature>,
}

impl From<PlanTier> for PlanDto {
    fn from(plan: PlanTier) -> Self {
        let config = plan.config();
        Self {
            plan,
            rank: plan.rank(),
            duration_days: config.duration_days,
            total_ads: config.total_ads,
            max_ads_per_month: config.max_ads_per_month,
            price: config.price,
            features: config.default_features(),
        }
    }
}

pub fn plan_catalog() -> Vec<PlanDto> {
    [PlanTier::Lite, PlanTier::Plus, PlanTier::Pro]
        .into_iter()
        .map(PlanDto::from)
        .collect()
}
