use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::plan_selections::PlanSelectionEntity;

use super::enums::{
    features::Feature, ledger_actions::LedgerAction, payment_statuses::PaymentStatus,
    plan_tiers::PlanTier,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerViolation {
    #[error("monthly limit reached: {ads_used}/{max_ads_per_month} ads used this month")]
    MonthlyLimitReached { ads_used: i32, max_ads_per_month: i32 },
    #[error("no ads remaining on the current plan")]
    NoAdsRemaining,
    #[error("topup can only be done for the same plan (current: {current}, requested: {requested})")]
    PlanMismatch { current: PlanTier, requested: PlanTier },
    #[error("upgrade can only be done to a higher plan (current: {current}, requested: {requested})")]
    NotAnUpgrade { current: PlanTier, requested: PlanTier },
    #[error("ad amount must be positive, got {0}")]
    InvalidAdAmount(i32),
    #[error("ad amount {0} would overflow the plan balance")]
    AdBalanceOverflow(i32),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectPlanModel {
    pub plan: PlanTier,
    #[serde(default)]
    pub features: Option<FeatureSelection>,
    #[serde(default)]
    pub total_ads: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePlanModel {
    pub plan: PlanTier,
    pub action: LedgerAction,
    /// Topup only. Upgrades always take the new plan's default features.
    #[serde(default)]
    pub features: Option<FeatureSelection>,
    #[serde(default)]
    pub total_ads: Option<i32>,
}

/// Features as sent by clients: a JSON list, or a string holding a JSON
/// array, a comma-separated list or a single name.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FeatureSelection {
    List(Vec<String>),
    Raw(String),
}

impl FeatureSelection {
    pub fn parse(&self) -> Result<Vec<Feature>, String> {
        let names: Vec<String> = match self {
            FeatureSelection::List(items) => items.clone(),
            FeatureSelection::Raw(raw) => {
                let raw = raw.trim();
                if raw.starts_with('[') {
                    serde_json::from_str::<Vec<String>>(raw)
                        .map_err(|err| format!("invalid features JSON: {err}"))?
                } else {
                    raw.split(',').map(str::to_string).collect()
                }
            }
        };

        let mut features = Vec::new();
        for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            let feature =
                Feature::from_str(name).ok_or_else(|| format!("unknown feature: {name}"))?;
            if !features.contains(&feature) {
                features.push(feature);
            }
        }
        Ok(features)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlanUpdateDto {
    pub action: LedgerAction,
    pub plan: PlanTier,
    pub previous_plan: Option<PlanTier>,
    pub added_ads: i32,
    pub carried_forward_ads: Option<i32>,
    pub started_fresh_cycle: bool,
    pub selection: PlanSelectionEntity,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TopupInfo {
    pub current_plan: PlanTier,
    pub can_topup: bool,
    pub next_period_start: NaiveDate,
    pub next_period_end: NaiveDate,
    pub topup_ads: i32,
    pub topup_monthly_limit: i32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlanStatusDto {
    pub plan: PlanTier,
    pub is_active: bool,
    pub days_remaining: i64,
    pub days_elapsed: i64,
    pub subscription_start_date: DateTime<Utc>,
    pub subscription_end_date: DateTime<Utc>,
    pub total_ads: i32,
    pub ads_used: i32,
    pub max_ads_per_month: i32,
    pub monthly_remaining: i32,
    pub selected_features: Vec<Feature>,
    pub topup_info: TopupInfo,
}

/// Snapshot of the counters after an analysis was charged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsageSnapshot {
    pub ads_used: i32,
    pub max_ads_per_month: i32,
    pub total_ads: i32,
}

impl PlanSelectionEntity {
    /// Starts a brand new selection. An empty feature list takes the plan defaults.
    pub fn select(
        user_id: Uuid,
        plan: PlanTier,
        features: Vec<Feature>,
        total_ads: Option<i32>,
        now: DateTime<Utc>,
    ) -> Result<Self, LedgerViolation> {
        let config = plan.config();
        let total_ads = positive_amount(total_ads, config.total_ads)?;
        let selected_features = if features.is_empty() {
            config.default_features()
        } else {
            features
        };

        Ok(Self {
            user_id,
            plan,
            total_ads,
            ads_used: 0,
            max_ads_per_month: config.max_ads_per_month,
            validity_days: config.duration_days as i32,
            total_price: config.price,
            selected_features,
            subscription_start_date: now,
            subscription_end_date: now + Duration::days(config.duration_days),
            last_usage_date: None,
            payment_status: PaymentStatus::Completed,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.subscription_end_date
    }

    /// Clears the monthly counter when `now` falls in a different calendar
    /// month than the last recorded usage. Returns whether it reset.
    pub fn apply_monthly_reset(&mut self, now: DateTime<Utc>) -> bool {
        let Some(last_usage) = self.last_usage_date else {
            return false;
        };

        if (last_usage.year(), last_usage.month()) == (now.year(), now.month()) {
            return false;
        }

        self.ads_used = 0;
        self.updated_at = now;
        true
    }

    pub fn ensure_quota(&self) -> Result<(), LedgerViolation> {
        if self.ads_used >= self.max_ads_per_month {
            return Err(LedgerViolation::MonthlyLimitReached {
                ads_used: self.ads_used,
                max_ads_per_month: self.max_ads_per_month,
            });
        }
        if self.total_ads <= 0 {
            return Err(LedgerViolation::NoAdsRemaining);
        }
        Ok(())
    }

    pub fn record_usage(&mut self, now: DateTime<Utc>) -> UsageSnapshot {
        self.ads_used += 1;
        self.total_ads -= 1;
        self.last_usage_date = Some(now);
        self.updated_at = now;

        UsageSnapshot {
            ads_used: self.ads_used,
            max_ads_per_month: self.max_ads_per_month,
            total_ads: self.total_ads,
        }
    }

    /// Buys another period of the same plan.
    ///
    /// An expired plan restarts today with a fresh monthly counter. An active
    /// plan queues the new period after the current end date and keeps the
    /// monthly counter and limit untouched.
    pub fn topup(
        &mut self,
        plan: PlanTier,
        features: Option<Vec<Feature>>,
        total_ads: Option<i32>,
        now: DateTime<Utc>,
    ) -> Result<PlanUpdateDto, LedgerViolation> {
        if plan != self.plan {
            return Err(LedgerViolation::PlanMismatch {
                current: self.plan,
                requested: plan,
            });
        }

        let config = plan.config();
        let topup_ads = positive_amount(total_ads, config.total_ads)?;
        let expired = self.is_expired(now);

        let overflow = || LedgerViolation::AdBalanceOverflow(topup_ads);
        let (new_total_ads, new_total_price) = if expired {
            let price = self.total_price.checked_add(config.price).ok_or_else(overflow)?;
            (topup_ads, price)
        } else {
            let ads = self.total_ads.checked_add(topup_ads).ok_or_else(overflow)?;
            (ads, self.total_price)
        };

        let new_start = if expired {
            now
        } else {
            self.subscription_end_date + Duration::days(1)
        };
        self.subscription_start_date = new_start;
        self.subscription_end_date = new_start + Duration::days(config.duration_days);
        self.validity_days = config.duration_days as i32;

        self.total_ads = new_total_ads;
        self.total_price = new_total_price;
        if expired {
            self.ads_used = 0;
            self.max_ads_per_month = config.max_ads_per_month;
            self.payment_status = PaymentStatus::Completed;
            self.is_active = true;
        }

        match features {
            Some(features) if !features.is_empty() => self.selected_features = features,
            _ if self.selected_features.is_empty() => {
                self.selected_features = config.default_features();
            }
            _ => {}
        }
        self.updated_at = now;

        Ok(PlanUpdateDto {
            action: LedgerAction::Topup,
            plan,
            previous_plan: None,
            added_ads: topup_ads,
            carried_forward_ads: None,
            started_fresh_cycle: expired,
            selection: self.clone(),
        })
    }

    /// Moves to a strictly higher tier, carrying remaining ads and stacking
    /// the monthly limits. The new period starts today.
    pub fn upgrade(
        &mut self,
        plan: PlanTier,
        total_ads: Option<i32>,
        now: DateTime<Utc>,
    ) -> Result<PlanUpdateDto, LedgerViolation> {
        if plan.rank() <= self.plan.rank() {
            return Err(LedgerViolation::NotAnUpgrade {
                current: self.plan,
                requested: plan,
            });
        }

        let config = plan.config();
        let new_plan_ads = positive_amount(total_ads, config.total_ads)?;
        let remaining_ads = self.total_ads;
        let previous_plan = self.plan;
        let overflow = || LedgerViolation::AdBalanceOverflow(new_plan_ads);
        let new_total_ads = remaining_ads.checked_add(new_plan_ads).ok_or_else(overflow)?;
        let new_monthly_limit = self
            .max_ads_per_month
            .checked_add(config.max_ads_per_month)
            .ok_or_else(overflow)?;
        let new_total_price = self.total_price.checked_add(config.price).ok_or_else(overflow)?;

        self.plan = plan;
        self.subscription_start_date = now;
        self.subscription_end_date = now + Duration::days(config.duration_days);
        self.validity_days = config.duration_days as i32;
        self.total_ads = new_total_ads;
        self.max_ads_per_month = new_monthly_limit;
        self.total_price = new_total_price;
        self.selected_features = config.default_features();
        self.payment_status = PaymentStatus::Completed;
        self.is_active = true;
        self.updated_at = now;

        Ok(PlanUpdateDto {
            action: LedgerAction::Upgrade,
            plan,
            previous_plan: Some(previous_plan),
            added_ads: new_plan_ads,
            carried_forward_ads: Some(remaining_ads),
            started_fresh_cycle: false,
            selection: self.clone(),
        })
    }

    pub fn status(&self, now: DateTime<Utc>) -> PlanStatusDto {
        let is_active = !self.is_expired(now);
        let days_remaining = if is_active {
            (self.subscription_end_date - now).num_days()
        } else {
            0
        };
        let days_elapsed = if now >= self.subscription_start_date {
            (now - self.subscription_start_date).num_days()
        } else {
            0
        };

        let config = self.plan.config();
        let next_period_start = if is_active {
            self.subscription_end_date + Duration::days(1)
        } else {
            now
        };

        PlanStatusDto {
            plan: self.plan,
            is_active,
            days_remaining,
            days_elapsed,
            subscription_start_date: self.subscription_start_date,
            subscription_end_date: self.subscription_end_date,
            total_ads: self.total_ads,
            ads_used: self.ads_used,
            max_ads_per_month: self.max_ads_per_month,
            monthly_remaining: (self.max_ads_per_month - self.ads_used).max(0),
            selected_features: self.selected_features.clone(),
            topup_info: TopupInfo {
                current_plan: self.plan,
                can_topup: is_active,
                next_period_start: next_period_start.date_naive(),
                next_period_end: (next_period_start + Duration::days(config.duration_days))
                    .date_naive(),
                topup_ads: config.total_ads,
                topup_monthly_limit: config.max_ads_per_month,
            },
        }
    }
}

fn positive_amount(custom: Option<i32>, fallback: i32) -> Result<i32, LedgerViolation> {
    match custom {
        Some(amount) if amount <= 0 => Err(LedgerViolation::InvalidAdAmount(amount)),
        Some(amount) => Ok(amount),
        None => Ok(fallback),
    }
}
