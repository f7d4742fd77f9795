use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    domain::value_objects::enums::{
        features::Feature, payment_statuses::PaymentStatus, plan_tiers::PlanTier,
    },
    infra::db::postgres::schema::plan_selections,
};

/// A user's current plan and how much of it has been consumed.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlanSelectionEntity {
    pub user_id: Uuid,
    pub plan: PlanTier,
    pub total_ads: i32,
    pub ads_used: i32,
    pub max_ads_per_month: i32,
    pub validity_days: i32,
    pub total_price: i32,
    pub selected_features: Vec<Feature>,
    pub subscription_start_date: DateTime<Utc>,
    pub subscription_end_date: DateTime<Utc>,
    pub last_usage_date: Option<DateTime<Utc>>,
    pub payment_status: PaymentStatus,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw row used for Diesel queries. Features stay as JSON.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable, Insertable)]
#[diesel(table_name = plan_selections, primary_key(user_id))]
pub struct PlanSelectionRow {
    pub user_id: Uuid,
    pub plan_name: String,
    pub total_ads: i32,
    pub ads_used: i32,
    pub max_ads_per_month: i32,
    pub validity_days: i32,
    pub total_price: i32,
    pub selected_features: serde_json::Value,
    pub subscription_start_date: DateTime<Utc>,
    pub subscription_end_date: DateTime<Utc>,
    pub last_usage_date: Option<DateTime<Utc>>,
    pub payment_status: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PlanSelectionRow> for PlanSelectionEntity {
    type Error = anyhow::Error;

    fn try_from(value: PlanSelectionRow) -> Result<Self> {
        let plan = PlanTier::from_str(&value.plan_name)
            .ok_or_else(|| anyhow!("unknown plan name in storage: {}", value.plan_name))?;
        let selected_features: Vec<Feature> = serde_json::from_value(value.selected_features)
            .context("selected_features is not a feature list")?;

        Ok(Self {
            user_id: value.user_id,
            plan,
            total_ads: value.total_ads,
            ads_used: value.ads_used,
            max_ads_per_month: value.max_ads_per_month,
            validity_days: value.validity_days,
            total_price: value.total_price,
            selected_features,
            subscription_start_date: value.subscription_start_date,
            subscription_end_date: value.subscription_end_date,
            last_usage_date: value.last_usage_date,
            payment_status: PaymentStatus::from_str(&value.payment_status),
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

impl TryFrom<&PlanSelectionEntity> for PlanSelectionRow {
    type Error = anyhow::Error;

    fn try_from(value: &PlanSelectionEntity) -> Result<Self> {
        Ok(Self {
            user_id: value.user_id,
            plan_name: value.plan.to_string(),
            total_ads: value.total_ads,
            ads_used: value.ads_used,
            max_ads_per_month: value.max_ads_per_month,
            validity_days: value.validity_days,
            total_price: value.total_price,
            selected_features: serde_json::to_value(&value.selected_features)?,
            subscription_start_date: value.subscription_start_date,
            subscription_end_date: value.subscription_end_date,
            last_usage_date: value.last_usage_date,
            payment_status: value.payment_status.to_string(),
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}
