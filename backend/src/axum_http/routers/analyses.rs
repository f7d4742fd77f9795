use std::{sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::{analyses::AnalysisRepository, plan_selections::PlanSelectionRepository},
        value_objects::analyses::{
            AdSubmission, BrandComplianceModel, ChannelComplianceModel, ContentAnalysisModel,
            HistoryQuery, MessageIntentModel,
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{analyses::AnalysisPostgres, plan_selections::PlanSelectionPostgres},
    },
    llm::{
        LlmGateway,
        llm_client::{LlmClientConfig, LlmHttpClient},
    },
};
use tracing::info;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppError,
    config::config_model::DotEnvyConfig,
    usecases::{
        brand_compliance::BrandComplianceUseCase,
        channel_compliance::ChannelComplianceUseCase,
        comprehensive_analysis::ComprehensiveAnalysisUseCase,
        content_analysis::ContentAnalysisUseCase,
        llm_runner::{AnalysisSettings, LlmRunner},
        message_intent::MessageIntentUseCase,
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Result<Router> {
    let llm_client = LlmHttpClient::new(LlmClientConfig {
        base_url: config.llm.base_url.clone(),
        api_key: config.llm.api_key.clone(),
        model: config.llm.model.clone(),
        temperature: config.llm.temperature,
        top_p: config.llm.top_p,
        request_timeout: Duration::from_secs(config.llm.request_timeout_secs),
    })?;
    let runner = Arc::new(LlmRunner::new(
        Arc::new(llm_client),
        AnalysisSettings::from(&config.llm),
    ));
    info!(model = %config.llm.model, "analyses: llm runner ready");

    let plan_selection_repository = PlanSelectionPostgres::new(Arc::clone(&db_pool));
    let analysis_repository = AnalysisPostgres::new(Arc::clone(&db_pool));
    let comprehensive_usecase = ComprehensiveAnalysisUseCase::new(
        Arc::new(plan_selection_repository),
        Arc::new(analysis_repository),
        Arc::clone(&runner),
    );

    let comprehensive = Router::new()
        .route("/comprehensive", post(comprehensive_analysis))
        .route("/history", get(history))
        .with_state(Arc::new(comprehensive_usecase));

    let channel = Router::new()
        .route("/channel-compliance", post(channel_compliance))
        .with_state(Arc::new(ChannelComplianceUseCase::new(Arc::clone(&runner))));

    let brand = Router::new()
        .route("/brand-compliance", post(brand_compliance))
        .with_state(Arc::new(BrandComplianceUseCase::new(Arc::clone(&runner))));

    let message = Router::new()
        .route("/message-intent", post(message_intent))
        .with_state(Arc::new(MessageIntentUseCase::new(Arc::clone(&runner))));

    let content = Router::new()
        .route("/content", post(content_analysis))
        .with_state(Arc::new(ContentAnalysisUseCase::new(runner)));

    Ok(comprehensive
        .merge(channel)
        .merge(brand)
        .merge(message)
        .merge(content))
}

pub async fn comprehensive_analysis<P, A, L>(
    State(usecase): State<Arc<ComprehensiveAnalysisUseCase<P, A, L>>>,
    auth: AuthUser,
    payload: Result<Json<AdSubmission>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    P: PlanSelectionRepository + Send + Sync + 'static,
    A: AnalysisRepository + Send + Sync + 'static,
    L: LlmGateway + Send + Sync + 'static,
{
    let Json(submission) = payload?;
    let analysis = usecase.analyze(auth.user_id, submission).await?;
    Ok((StatusCode::OK, Json(analysis)))
}

pub async fn history<P, A, L>(
    State(usecase): State<Arc<ComprehensiveAnalysisUseCase<P, A, L>>>,
    auth: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, AppError>
where
    P: PlanSelectionRepository + Send + Sync + 'static,
    A: AnalysisRepository + Send + Sync + 'static,
    L: LlmGateway + Send + Sync + 'static,
{
    let records = usecase.history(auth.user_id, query.limit).await?;
    Ok((StatusCode::OK, Json(records)))
}

pub async fn channel_compliance<L>(
    State(usecase): State<Arc<ChannelComplianceUseCase<L>>>,
    _auth: AuthUser,
    payload: Result<Json<ChannelComplianceModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    L: LlmGateway + Send + Sync + 'static,
{
    let Json(model) = payload?;
    let report = usecase
        .analyze(&model.media, &model.platforms, &model.ad_description)
        .await?;
    Ok((StatusCode::OK, Json(report)))
}

pub async fn brand_compliance<L>(
    State(usecase): State<Arc<BrandComplianceUseCase<L>>>,
    _auth: AuthUser,
    payload: Result<Json<BrandComplianceModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    L: LlmGateway + Send + Sync + 'static,
{
    let Json(model) = payload?;
    let report = usecase.analyze(&model.media, &model.brand).await?;
    Ok((StatusCode::OK, Json(report)))
}

pub async fn message_intent<L>(
    State(usecase): State<Arc<MessageIntentUseCase<L>>>,
    _auth: AuthUser,
    payload: Result<Json<MessageIntentModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    L: LlmGateway + Send + Sync + 'static,
{
    let Json(model) = payload?;
    let report = usecase
        .analyze(&model.media, &model.ad_description, model.funnel_type.as_deref())
        .await?;
    Ok((StatusCode::OK, Json(report)))
}

pub async fn content_analysis<L>(
    State(usecase): State<Arc<ContentAnalysisUseCase<L>>>,
    _auth: AuthUser,
    payload: Result<Json<ContentAnalysisModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    L: LlmGateway + Send + Sync + 'static,
{
    let Json(model) = payload?;
    let report = usecase.analyze(&model.media).await?;
    Ok((StatusCode::OK, Json(report)))
}
