use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::analyses;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = analyses)]
pub struct AnalysisEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub brand_id: Option<String>,
    pub ad_title: String,
    pub media_kind: String,
    pub requested_features: serde_json::Value,
    pub results: serde_json::Value,
    pub usage: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = analyses)]
pub struct InsertAnalysisEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub brand_id: Option<String>,
    pub ad_title: String,
    pub media_kind: String,
    pub requested_features: serde_json::Value,
    pub results: serde_json::Value,
    pub usage: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
