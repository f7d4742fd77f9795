use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::analyses::AnalysisEntity;

use super::{
    brand_compliance::{BrandComplianceReport, BrandGuidelines},
    compliance::ChannelComplianceReport,
    enums::{features::Feature, media_kinds::MediaKind},
    media::AdMedia,
    message_intent::MessageIntentReport,
    plan_selections::UsageSnapshot,
    purchase_intent::PurchaseIntentReport,
};

/// Everything a client sends to have one ad analysed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdSubmission {
    pub ad_title: String,
    #[serde(default)]
    pub ad_description: String,
    #[serde(default)]
    pub brand_id: Option<String>,
    pub media: AdMedia,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub brand: BrandGuidelines,
    /// The funnel stage the advertiser believes the ad targets.
    #[serde(default)]
    pub funnel_type: Option<String>,
    /// Empty means every feature on the user's plan.
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelComplianceModel {
    #[serde(default)]
    pub ad_description: String,
    pub media: AdMedia,
    pub platforms: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrandComplianceModel {
    pub media: AdMedia,
    #[serde(default)]
    pub brand: BrandGuidelines,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageIntentModel {
    #[serde(default)]
    pub ad_description: String,
    pub media: AdMedia,
    #[serde(default)]
    pub funnel_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentAnalysisModel {
    pub media: AdMedia,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// A section either completes or records why it failed; failures never abort
/// the other sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SectionOutcome<T> {
    Failed { error: String },
    Completed(T),
}

impl<T> SectionOutcome<T> {
    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => SectionOutcome::Completed(value),
            Err(err) => SectionOutcome::Failed {
                error: err.to_string(),
            },
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, SectionOutcome::Completed(_))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisSections {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_intent: Option<SectionOutcome<MessageIntentReport>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_compliance: Option<SectionOutcome<BrandComplianceReport>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_analysis: Option<SectionOutcome<PurchaseIntentReport>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_compliance: Option<SectionOutcome<ChannelComplianceReport>>,
}

impl AnalysisSections {
    pub fn completed_count(&self) -> usize {
        [
            self.message_intent.as_ref().map(SectionOutcome::is_completed),
            self.brand_compliance.as_ref().map(SectionOutcome::is_completed),
            self.content_analysis.as_ref().map(SectionOutcome::is_completed),
            self.channel_compliance.as_ref().map(SectionOutcome::is_completed),
        ]
        .into_iter()
        .filter(|completed| *completed == Some(true))
        .count()
    }

    pub fn errors(&self) -> Vec<String> {
        fn error_of<T>(section: &Option<SectionOutcome<T>>) -> Option<String> {
            match section {
                Some(SectionOutcome::Failed { error }) => Some(error.clone()),
                _ => None,
            }
        }

        [
            error_of(&self.message_intent),
            error_of(&self.brand_compliance),
            error_of(&self.content_analysis),
            error_of(&self.channel_compliance),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ComprehensiveAnalysisDto {
    pub analysis_id: Uuid,
    pub ad_title: String,
    pub media_kind: MediaKind,
    pub features: Vec<Feature>,
    pub results: AnalysisSections,
    pub usage: UsageSnapshot,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalysisRecordDto {
    pub id: Uuid,
    pub brand_id: Option<String>,
    pub ad_title: String,
    pub media_kind: String,
    pub requested_features: serde_json::Value,
    pub results: serde_json::Value,
    pub usage: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<AnalysisEntity> for AnalysisRecordDto {
    fn from(value: AnalysisEntity) -> Self {
        Self {
            id: value.id,
            brand_id: value.brand_id,
            ad_title: value.ad_title,
            media_kind: value.media_kind,
            requested_features: value.requested_features,
            results: value.results,
            usage: value.usage,
            created_at: value.created_at,
        }
    }
}
