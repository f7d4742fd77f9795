use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use crates::domain::{
    entities::plan_selections::PlanSelectionEntity,
    repositories::plan_selections::PlanSelectionRepository,
    value_objects::{
        enums::{features::Feature, ledger_actions::LedgerAction},
        plan_selections::{
            FeatureSelection, LedgerViolation, PlanStatusDto, PlanUpdateDto, SelectPlanModel,
            UpdatePlanModel,
        },
        plans::{PlanDto, plan_catalog},
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("no plan selected")]
    PlanNotFound,
    #[error("invalid features: {0}")]
    InvalidFeatures(String),
    #[error(transparent)]
    Violation(#[from] LedgerViolation),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl LedgerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::PlanNotFound => StatusCode::NOT_FOUND,
            LedgerError::InvalidFeatures(_) => StatusCode::BAD_REQUEST,
            LedgerError::Violation(LedgerViolation::MonthlyLimitReached { .. }) => {
                StatusCode::TOO_MANY_REQUESTS
            }
            LedgerError::Violation(_) => StatusCode::BAD_REQUEST,
            LedgerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, LedgerError>;

fn parse_features(features: Option<&FeatureSelection>) -> UseCaseResult<Option<Vec<Feature>>> {
    features
        .map(|selection| selection.parse().map_err(LedgerError::InvalidFeatures))
        .transpose()
}

pub struct PlanLedgerUseCase<P>
where
    P: PlanSelectionRepository + Send + Sync + 'static,
{
    plan_selection_repo: Arc<P>,
}

impl<P> PlanLedgerUseCase<P>
where
    P: PlanSelectionRepository + Send + Sync + 'static,
{
    pub fn new(plan_selection_repo: Arc<P>) -> Self {
        Self {
            plan_selection_repo,
        }
    }

    pub fn list_plans(&self) -> Vec<PlanDto> {
        plan_catalog()
    }

    /// Creates or replaces the user's selection with a fresh cycle.
    pub async fn select_plan(
        &self,
        user_id: Uuid,
        model: SelectPlanModel,
    ) -> UseCaseResult<PlanSelectionEntity> {
        let features = parse_features(model.features.as_ref())?.unwrap_or_default();
        let selection =
            PlanSelectionEntity::select(user_id, model.plan, features, model.total_ads, Utc::now())?;

        let saved = self
            .plan_selection_repo
            .upsert(selection)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "plan_ledger: failed to save plan selection");
                LedgerError::Internal(err)
            })?;

        info!(
            %user_id,
            plan = %saved.plan,
            total_ads = saved.total_ads,
            "plan_ledger: plan selected"
        );
        Ok(saved)
    }

    pub async fn plan_status(&self, user_id: Uuid) -> UseCaseResult<PlanStatusDto> {
        let mut selection = self.load_selection(user_id).await?;
        let now = Utc::now();
        selection.apply_monthly_reset(now);
        Ok(selection.status(now))
    }

    /// Applies a topup (same plan) or an upgrade (higher tier).
    pub async fn update_plan(
        &self,
        user_id: Uuid,
        model: UpdatePlanModel,
    ) -> UseCaseResult<PlanUpdateDto> {
        let mut selection = self.load_selection(user_id).await?;
        let now = Utc::now();

        let outcome = match model.action {
            LedgerAction::Topup => {
                let features = parse_features(model.features.as_ref())?;
                selection.topup(model.plan, features, model.total_ads, now)
            }
            LedgerAction::Upgrade => selection.upgrade(model.plan, model.total_ads, now),
        };

        let mut update = outcome.map_err(|violation| {
            warn!(
                %user_id,
                action = %model.action,
                reason = %violation,
                "plan_ledger: plan update rejected"
            );
            LedgerError::Violation(violation)
        })?;

        update.selection = self
            .plan_selection_repo
            .upsert(selection)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "plan_ledger: failed to save plan update");
                LedgerError::Internal(err)
            })?;

        info!(
            %user_id,
            action = %update.action,
            plan = %update.plan,
            added_ads = update.added_ads,
            fresh_cycle = update.started_fresh_cycle,
            "plan_ledger: plan updated"
        );
        Ok(update)
    }

    async fn load_selection(&self, user_id: Uuid) -> UseCaseResult<PlanSelectionEntity> {
        self.plan_selection_repo
            .find_by_user_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "plan_ledger: failed to load plan selection");
                LedgerError::Internal(err)
            })?
            .ok_or_else(|| {
                info!(%user_id, "plan_ledger: no plan selected");
                LedgerError::PlanNotFound
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration};
    use crates::domain::{
        repositories::plan_selections::MockPlanSelectionRepository,
        value_objects::enums::plan_tiers::PlanTier,
    };
    use mockall::predicate::eq;

    fn selection(user_id: Uuid, plan: PlanTier, started: DateTime<Utc>) -> PlanSelectionEntity {
        PlanSelectionEntity::select(user_id, plan, Vec::new(), None, started).unwrap()
    }

    fn echo_upsert(repo: &mut MockPlanSelectionRepository) {
        repo.expect_upsert()
            .times(1)
            .returning(|selection| Box::pin(async move { Ok(selection) }));
    }

    #[tokio::test]
    async fn select_plan_parses_features_and_saves() {
        let user_id = Uuid::new_v4();
        let mut repo = MockPlanSelectionRepository::new();
        repo.expect_upsert()
            .withf(move |selection| {
                selection.user_id == user_id
                    && selection.ads_used == 0
                    && selection.selected_features
                        == vec![Feature::BrandCompliance, Feature::ChannelCompliance]
            })
            .times(1)
            .returning(|selection| Box::pin(async move { Ok(selection) }));

        let usecase = PlanLedgerUseCase::new(Arc::new(repo));
        let saved = usecase
            .select_plan(
                user_id,
                SelectPlanModel {
                    plan: PlanTier::Plus,
                    features: Some(FeatureSelection::Raw(
                        "brand_compliance, channel_compliance".to_string(),
                    )),
                    total_ads: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(saved.total_ads, 30);
        assert_eq!(saved.max_ads_per_month, 5);
    }

    #[tokio::test]
    async fn select_plan_rejects_unknown_feature() {
        let mut repo = MockPlanSelectionRepository::new();
        repo.expect_upsert().never();

        let usecase = PlanLedgerUseCase::new(Arc::new(repo));
        let result = usecase
            .select_plan(
                Uuid::new_v4(),
                SelectPlanModel {
                    plan: PlanTier::Lite,
                    features: Some(FeatureSelection::List(vec!["telepathy".to_string()])),
                    total_ads: None,
                },
            )
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidFeatures(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn status_requires_a_selection() {
        let user_id = Uuid::new_v4();
        let mut repo = MockPlanSelectionRepository::new();
        repo.expect_find_by_user_id()
            .with(eq(user_id))
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = PlanLedgerUseCase::new(Arc::new(repo));
        let err = usecase.plan_status(user_id).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn status_reports_remaining_quota() {
        let user_id = Uuid::new_v4();
        let mut current = selection(user_id, PlanTier::Lite, Utc::now() - Duration::days(10));
        current.ads_used = 1;
        current.total_ads = 11;
        current.last_usage_date = Some(Utc::now());

        let mut repo = MockPlanSelectionRepository::new();
        repo.expect_find_by_user_id()
            .with(eq(user_id))
            .returning(move |_| {
                let current = current.clone();
                Box::pin(async move { Ok(Some(current)) })
            });

        let usecase = PlanLedgerUseCase::new(Arc::new(repo));
        let status = usecase.plan_status(user_id).await.unwrap();

        assert!(status.is_active);
        assert_eq!(status.monthly_remaining, 3);
        assert_eq!(status.days_elapsed, 10);
        assert!(status.topup_info.can_topup);
    }

    #[tokio::test]
    async fn topup_on_active_plan_adds_ads() {
        let user_id = Uuid::new_v4();
        let mut current = selection(user_id, PlanTier::Lite, Utc::now() - Duration::days(5));
        current.ads_used = 2;
        current.total_ads = 10;

        let mut repo = MockPlanSelectionRepository::new();
        repo.expect_find_by_user_id().returning(move |_| {
            let current = current.clone();
            Box::pin(async move { Ok(Some(current)) })
        });
        echo_upsert(&mut repo);

        let usecase = PlanLedgerUseCase::new(Arc::new(repo));
        let update = usecase
            .update_plan(
                user_id,
                UpdatePlanModel {
                    plan: PlanTier::Lite,
                    action: LedgerAction::Topup,
                    features: None,
                    total_ads: None,
                },
            )
            .await
            .unwrap();

        assert!(!update.started_fresh_cycle);
        assert_eq!(update.added_ads, 12);
        assert_eq!(update.selection.total_ads, 22);
        assert_eq!(update.selection.ads_used, 2);
    }

    #[tokio::test]
    async fn topup_to_another_plan_is_rejected_without_saving() {
        let user_id = Uuid::new_v4();
        let current = selection(user_id, PlanTier::Lite, Utc::now());

        let mut repo = MockPlanSelectionRepository::new();
        repo.expect_find_by_user_id().returning(move |_| {
            let current = current.clone();
            Box::pin(async move { Ok(Some(current)) })
        });
        repo.expect_upsert().never();

        let usecase = PlanLedgerUseCase::new(Arc::new(repo));
        let err = usecase
            .update_plan(
                user_id,
                UpdatePlanModel {
                    plan: PlanTier::Pro,
                    action: LedgerAction::Topup,
                    features: None,
                    total_ads: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LedgerError::Violation(LedgerViolation::PlanMismatch { .. })
        ));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upgrade_stacks_limits_and_carries_ads() {
        let user_id = Uuid::new_v4();
        let mut current = selection(user_id, PlanTier::Lite, Utc::now() - Duration::days(20));
        current.ads_used = 3;
        current.total_ads = 9;

        let mut repo = MockPlanSelectionRepository::new();
        repo.expect_find_by_user_id().returning(move |_| {
            let current = current.clone();
            Box::pin(async move { Ok(Some(current)) })
        });
        echo_upsert(&mut repo);

        let usecase = PlanLedgerUseCase::new(Arc::new(repo));
        let update = usecase
            .update_plan(
                user_id,
                UpdatePlanModel {
                    plan: PlanTier::Pro,
                    action: LedgerAction::Upgrade,
                    features: None,
                    total_ads: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(update.previous_plan, Some(PlanTier::Lite));
        assert_eq!(update.carried_forward_ads, Some(9));
        assert_eq!(update.selection.total_ads, 141);
        assert_eq!(update.selection.max_ads_per_month, 15);
        assert_eq!(update.selection.ads_used, 3);
        assert_eq!(update.selection.total_price, 450);
    }

    #[tokio::test]
    async fn database_failure_is_internal() {
        let mut repo = MockPlanSelectionRepository::new();
        repo.expect_find_by_user_id()
            .returning(|_| Box::pin(async { Err(anyhow::anyhow!("connection refused")) }));

        let usecase = PlanLedgerUseCase::new(Arc::new(repo));
        let err = usecase.plan_status(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
