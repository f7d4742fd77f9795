use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use crates::{
    domain::{
        entities::{analyses::InsertAnalysisEntity, plan_selections::PlanSelectionEntity},
        repositories::{analyses::AnalysisRepository, plan_selections::PlanSelectionRepository},
        value_objects::{
            analyses::{AdSubmission, AnalysisRecordDto, AnalysisSections, ComprehensiveAnalysisDto, SectionOutcome},
            enums::{analysis_kinds::AnalysisKind, features::Feature},
        },
    },
    llm::LlmGateway,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{
    brand_compliance::BrandComplianceUseCase,
    channel_compliance::ChannelComplianceUseCase,
    content_analysis::ContentAnalysisUseCase,
    llm_runner::{AnalysisError, LlmRunner, UseCaseResult, validate_media},
    message_intent::MessageIntentUseCase,
};

pub const DEFAULT_HISTORY_LIMIT: i64 = 20;
pub const MAX_HISTORY_LIMIT: i64 = 100;

/// Runs every requested analysis for one ad, gated and charged against the
/// user's plan.
pub struct ComprehensiveAnalysisUseCase<P, A, L>
where
    P: PlanSelectionRepository + Send + Sync + 'static,
    A: AnalysisRepository + Send + Sync + 'static,
    L: LlmGateway + Send + Sync + 'static,
{
    plan_selection_repo: Arc<P>,
    analysis_repo: Arc<A>,
    channel_compliance: ChannelComplianceUseCase<L>,
    brand_compliance: BrandComplianceUseCase<L>,
    message_intent: MessageIntentUseCase<L>,
    content_analysis: ContentAnalysisUseCase<L>,
}

impl<P, A, L> ComprehensiveAnalysisUseCase<P, A, L>
where
    P: PlanSelectionRepository + Send + Sync + 'static,
    A: AnalysisRepository + Send + Sync + 'static,
    L: LlmGateway + Send + Sync + 'static,
{
    pub fn new(plan_selection_repo: Arc<P>, analysis_repo: Arc<A>, runner: Arc<LlmRunner<L>>) -> Self {
        Self {
            plan_selection_repo,
            analysis_repo,
            channel_compliance: ChannelComplianceUseCase::new(Arc::clone(&runner)),
            brand_compliance: BrandComplianceUseCase::new(Arc::clone(&runner)),
            message_intent: MessageIntentUseCase::new(Arc::clone(&runner)),
            content_analysis: ContentAnalysisUseCase::new(runner),
        }
    }

    pub async fn analyze(
        &self,
        user_id: Uuid,
        submission: AdSubmission,
    ) -> UseCaseResult<ComprehensiveAnalysisDto> {
        validate_media(&submission.media)?;

        let mut selection = self.load_selection(user_id).await?;
        let now = Utc::now();
        if selection.apply_monthly_reset(now) {
            info!(%user_id, "comprehensive_analysis: monthly usage reset");
        }
        selection.ensure_quota().map_err(|violation| {
            warn!(%user_id, reason = %violation, "comprehensive_analysis: usage gate rejected");
            AnalysisError::Quota(violation)
        })?;

        let features = resolve_features(&submission.features, &selection)?;
        info!(
            %user_id,
            ad_title = %submission.ad_title,
            features = ?features,
            "comprehensive_analysis: starting"
        );

        let sections = self.run_sections(&submission, &features).await;
        if sections.completed_count() == 0 {
            let errors = sections.errors().join("; ");
            warn!(%user_id, errors = %errors, "comprehensive_analysis: every section failed");
            return Err(AnalysisError::AllSectionsFailed(errors));
        }

        let usage = selection.record_usage(now);
        self.plan_selection_repo
            .upsert(selection)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "comprehensive_analysis: failed to charge usage");
                AnalysisError::Internal(err)
            })?;

        let record = InsertAnalysisEntity {
            id: Uuid::new_v4(),
            user_id,
            brand_id: submission.brand_id.clone(),
            ad_title: submission.ad_title.clone(),
            media_kind: submission.media.kind.to_string(),
            requested_features: serde_json::to_value(&features)
                .context("failed to encode requested features")?,
            results: serde_json::to_value(&sections).context("failed to encode analysis results")?,
            usage: serde_json::to_value(&usage).context("failed to encode usage snapshot")?,
            created_at: now,
        };

        let analysis_id = self.analysis_repo.insert(record).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "comprehensive_analysis: failed to store analysis");
            AnalysisError::Internal(err)
        })?;

        info!(
            %user_id,
            %analysis_id,
            completed = sections.completed_count(),
            ads_used = usage.ads_used,
            total_ads = usage.total_ads,
            "comprehensive_analysis: complete"
        );

        Ok(ComprehensiveAnalysisDto {
            analysis_id,
            ad_title: submission.ad_title,
            media_kind: submission.media.kind,
            features,
            results: sections,
            usage,
            created_at: now,
        })
    }

    pub async fn history(&self, user_id: Uuid, limit: Option<i64>) -> UseCaseResult<Vec<AnalysisRecordDto>> {
        let limit = limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);

        let records = self
            .analysis_repo
            .list_by_user(user_id, limit)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "comprehensive_analysis: failed to list history");
                AnalysisError::Internal(err)
            })?;

        Ok(records.into_iter().map(AnalysisRecordDto::from).collect())
    }

    async fn run_sections(&self, submission: &AdSubmission, features: &[Feature]) -> AnalysisSections {
        let mut kinds: Vec<AnalysisKind> = features.iter().map(Feature::analysis_kind).collect();
        kinds.sort();
        kinds.dedup();

        let media = &submission.media;
        let mut sections = AnalysisSections::default();
        for kind in kinds {
            match kind {
                AnalysisKind::MessageIntent => {
                    let result = self
                        .message_intent
                        .analyze(media, &submission.ad_description, submission.funnel_type.as_deref())
                        .await;
                    sections.message_intent = Some(section(kind, result));
                }
                AnalysisKind::BrandCompliance => {
                    let result = self.brand_compliance.analyze(media, &submission.brand).await;
                    sections.brand_compliance = Some(section(kind, result));
                }
                AnalysisKind::ContentAnalysis => {
                    let result = self.content_analysis.analyze(media).await;
                    sections.content_analysis = Some(section(kind, result));
                }
                AnalysisKind::ChannelCompliance => {
                    let result = self
                        .channel_compliance
                        .analyze(media, &submission.platforms, &submission.ad_description)
                        .await;
                    sections.channel_compliance = Some(section(kind, result));
                }
            }
        }
        sections
    }

    async fn load_selection(&self, user_id: Uuid) -> UseCaseResult<PlanSelectionEntity> {
        self.plan_selection_repo
            .find_by_user_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "comprehensive_analysis: failed to load plan selection");
                AnalysisError::Internal(err)
            })?
            .ok_or(AnalysisError::PlanNotFound)
    }
}

fn section<T>(kind: AnalysisKind, result: UseCaseResult<T>) -> SectionOutcome<T> {
    if let Err(err) = &result {
        warn!(section = %kind, error = %err, "comprehensive_analysis: section failed");
    }
    SectionOutcome::from_result(result)
}

/// Requested features, or the plan's when none were named. Asking for a
/// feature the plan lacks is refused.
fn resolve_features(requested: &[Feature], selection: &PlanSelectionEntity) -> UseCaseResult<Vec<Feature>> {
    if requested.is_empty() {
        return Ok(selection.selected_features.clone());
    }

    let mut features = Vec::new();
    for feature in requested {
        if !selection.selected_features.contains(feature) {
            return Err(AnalysisError::FeatureNotInPlan(*feature));
        }
        if !features.contains(feature) {
            features.push(*feature);
        }
    }
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::llm_runner::test_support::{fast_settings, image};
    use axum::http::StatusCode;
    use crates::{
        domain::{
            entities::analyses::AnalysisEntity,
            repositories::{analyses::MockAnalysisRepository, plan_selections::MockPlanSelectionRepository},
            value_objects::{
                brand_compliance::BrandGuidelines, enums::plan_tiers::PlanTier,
                plan_selections::LedgerViolation,
            },
        },
        llm::{LlmError, MockLlmGateway},
    };
    use mockall::predicate::eq;

    const BRAND_REPLY: &str = "Q1: Yes\nQ2: Yes\nQ3: Yes\nQ4: No\nQ5: Yes";

    fn submission(features: Vec<Feature>) -> AdSubmission {
        AdSubmission {
            ad_title: "Spring launch".to_string(),
            ad_description: "New running shoes".to_string(),
            brand_id: Some("brand-1".to_string()),
            media: image(1080, 1920),
            platforms: vec!["Facebook".to_string()],
            brand: BrandGuidelines::default(),
            funnel_type: Some("Awareness".to_string()),
            features,
        }
    }

    fn lite_selection(user_id: Uuid) -> PlanSelectionEntity {
        PlanSelectionEntity::select(user_id, PlanTier::Lite, Vec::new(), None, Utc::now()).unwrap()
    }

    fn repo_with(selection: PlanSelectionEntity) -> MockPlanSelectionRepository {
        let mut repo = MockPlanSelectionRepository::new();
        let user_id = selection.user_id;
        repo.expect_find_by_user_id()
            .with(eq(user_id))
            .returning(move |_| {
                let selection = selection.clone();
                Box::pin(async move { Ok(Some(selection)) })
            });
        repo
    }

    fn usecase(
        plan_repo: MockPlanSelectionRepository,
        analysis_repo: MockAnalysisRepository,
        gateway: MockLlmGateway,
    ) -> ComprehensiveAnalysisUseCase<MockPlanSelectionRepository, MockAnalysisRepository, MockLlmGateway> {
        ComprehensiveAnalysisUseCase::new(
            Arc::new(plan_repo),
            Arc::new(analysis_repo),
            Arc::new(LlmRunner::new(Arc::new(gateway), fast_settings())),
        )
    }

    #[tokio::test]
    async fn charges_once_when_a_section_succeeds() {
        let user_id = Uuid::new_v4();
        let mut plan_repo = repo_with(lite_selection(user_id));
        plan_repo
            .expect_upsert()
            .withf(|selection| selection.ads_used == 1 && selection.total_ads == 11)
            .times(1)
            .returning(|selection| Box::pin(async move { Ok(selection) }));

        let analysis_id = Uuid::new_v4();
        let mut analysis_repo = MockAnalysisRepository::new();
        analysis_repo
            .expect_insert()
            .withf(move |record| {
                record.user_id == user_id
                    && record.media_kind == "image"
                    && record.results.get("brand_compliance").is_some()
                    && record.results["channel_compliance"].get("error").is_none()
            })
            .times(1)
            .returning(move |_| Box::pin(async move { Ok(analysis_id) }));

        // channel compliance falls back to conservative verdicts when the model fails
        let mut gateway = MockLlmGateway::new();
        gateway.expect_generate().returning(|request| {
            let is_brand = request.parts.iter().any(|part| {
                matches!(part, crates::llm::ContentPart::Text(text) if text.contains("brand compliance reviewer"))
            });
            Box::pin(async move {
                if is_brand {
                    Ok(BRAND_REPLY.to_string())
                } else {
                    Err(LlmError::InvalidResponse("empty".to_string()))
                }
            })
        });

        let dto = usecase(plan_repo, analysis_repo, gateway)
            .analyze(
                user_id,
                submission(vec![Feature::BrandCompliance, Feature::ChannelCompliance]),
            )
            .await
            .unwrap();

        assert_eq!(dto.analysis_id, analysis_id);
        assert_eq!(dto.usage.ads_used, 1);
        assert_eq!(dto.usage.total_ads, 11);
        assert_eq!(dto.results.completed_count(), 2);
        assert!(dto.results.message_intent.is_none());
    }

    #[tokio::test]
    async fn nothing_is_charged_when_every_section_fails() {
        let user_id = Uuid::new_v4();
        let mut plan_repo = repo_with(lite_selection(user_id));
        plan_repo.expect_upsert().never();
        let mut analysis_repo = MockAnalysisRepository::new();
        analysis_repo.expect_insert().never();

        let mut gateway = MockLlmGateway::new();
        gateway
            .expect_generate()
            .returning(|_| Box::pin(async { Ok("no idea".to_string()) }));

        let err = usecase(plan_repo, analysis_repo, gateway)
            .analyze(user_id, submission(vec![Feature::BrandCompliance, Feature::MessagingIntent]))
            .await
            .unwrap_err();

        let AnalysisError::AllSectionsFailed(errors) = &err else {
            panic!("unexpected error: {err:?}");
        };
        assert!(errors.contains("; "));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn features_outside_the_plan_are_refused() {
        let user_id = Uuid::new_v4();
        let mut plan_repo = repo_with(lite_selection(user_id));
        plan_repo.expect_upsert().never();
        let mut gateway = MockLlmGateway::new();
        gateway.expect_generate().never();

        let err = usecase(plan_repo, MockAnalysisRepository::new(), gateway)
            .analyze(user_id, submission(vec![Feature::BrandCompliance, Feature::ResonanceIndex]))
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::FeatureNotInPlan(Feature::ResonanceIndex)));
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn monthly_limit_blocks_before_any_model_call() {
        let user_id = Uuid::new_v4();
        let mut selection = lite_selection(user_id);
        selection.ads_used = 4;
        selection.last_usage_date = Some(Utc::now());

        let mut plan_repo = repo_with(selection);
        plan_repo.expect_upsert().never();
        let mut gateway = MockLlmGateway::new();
        gateway.expect_generate().never();

        let err = usecase(plan_repo, MockAnalysisRepository::new(), gateway)
            .analyze(user_id, submission(Vec::new()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AnalysisError::Quota(LedgerViolation::MonthlyLimitReached { ads_used: 4, max_ads_per_month: 4 })
        ));
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn missing_plan_is_not_found() {
        let mut plan_repo = MockPlanSelectionRepository::new();
        plan_repo
            .expect_find_by_user_id()
            .returning(|_| Box::pin(async { Ok(None) }));

        let err = usecase(plan_repo, MockAnalysisRepository::new(), MockLlmGateway::new())
            .analyze(Uuid::new_v4(), submission(Vec::new()))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn history_clamps_limit() {
        let user_id = Uuid::new_v4();
        let mut analysis_repo = MockAnalysisRepository::new();
        analysis_repo
            .expect_list_by_user()
            .with(eq(user_id), eq(MAX_HISTORY_LIMIT))
            .times(1)
            .returning(move |user_id, _| {
                let record = AnalysisEntity {
                    id: Uuid::new_v4(),
                    user_id,
                    brand_id: None,
                    ad_title: "Spring launch".to_string(),
                    media_kind: "video".to_string(),
                    requested_features: serde_json::json!(["channel_compliance"]),
                    results: serde_json::json!({}),
                    usage: serde_json::json!({"ads_used": 1, "max_ads_per_month": 4, "total_ads": 11}),
                    created_at: Utc::now(),
                };
                Box::pin(async move { Ok(vec![record]) })
            });

        let records = usecase(MockPlanSelectionRepository::new(), analysis_repo, MockLlmGateway::new())
            .history(user_id, Some(500))
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ad_title, "Spring launch");
    }
}
