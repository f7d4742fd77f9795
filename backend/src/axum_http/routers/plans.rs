use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::plan_selections::PlanSelectionRepository,
        value_objects::plan_selections::{SelectPlanModel, UpdatePlanModel},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::plan_selections::PlanSelectionPostgres,
    },
};

use crate::{
    auth::AuthUser, axum_http::error_responses::AppError, usecases::plan_ledger::PlanLedgerUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let plan_selection_repository = PlanSelectionPostgres::new(Arc::clone(&db_pool));
    let plan_ledger_usecase = PlanLedgerUseCase::new(Arc::new(plan_selection_repository));

    Router::new()
        .route("/catalog", get(list_plans))
        .route("/select", post(select_plan))
        .route("/status", get(plan_status))
        .route("/update", post(update_plan))
        .with_state(Arc::new(plan_ledger_usecase))
}

pub async fn list_plans<T>(State(plan_ledger_usecase): State<Arc<PlanLedgerUseCase<T>>>) -> impl IntoResponse
where
    T: PlanSelectionRepository + Send + Sync + 'static,
{
    (StatusCode::OK, Json(plan_ledger_usecase.list_plans()))
}

pub async fn select_plan<T>(
    State(plan_ledger_usecase): State<Arc<PlanLedgerUseCase<T>>>,
    auth: AuthUser,
    payload: Result<Json<SelectPlanModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    T: PlanSelectionRepository + Send + Sync + 'static,
{
    let Json(select_plan_model) = payload?;
    let selection = plan_ledger_usecase
        .select_plan(auth.user_id, select_plan_model)
        .await?;
    Ok((StatusCode::CREATED, Json(selection)))
}

pub async fn plan_status<T>(
    State(plan_ledger_usecase): State<Arc<PlanLedgerUseCase<T>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    T: PlanSelectionRepository + Send + Sync + 'static,
{
    let status = plan_ledger_usecase.plan_status(auth.user_id).await?;
    Ok((StatusCode::OK, Json(status)))
}

pub async fn update_plan<T>(
    State(plan_ledger_usecase): State<Arc<PlanLedgerUseCase<T>>>,
    auth: AuthUser,
    payload: Result<Json<UpdatePlanModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    T: PlanSelectionRepository + Send + Sync + 'static,
{
    let Json(update_plan_model) = payload?;
    let update = plan_ledger_usecase
        .update_plan(auth.user_id, update_plan_model)
        .await?;
    Ok((StatusCode::OK, Json(update)))
}
