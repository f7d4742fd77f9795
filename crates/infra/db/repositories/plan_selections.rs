use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, prelude::*, upsert::excluded};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain;
use crate::infra::db::postgres::{postgres_connection::PgPoolSquad, schema::plan_selections};
use domain::{
    entities::plan_selections::{PlanSelectionEntity, PlanSelectionRow},
    repositories::plan_selections::PlanSelectionRepository,
};

pub struct PlanSelectionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PlanSelectionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PlanSelectionRepository for PlanSelectionPostgres {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<PlanSelectionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = plan_selections::table
            .filter(plan_selections::user_id.eq(user_id))
            .select(PlanSelectionRow::as_select())
            .first::<PlanSelectionRow>(&mut conn)
            .optional()?;

        row.map(PlanSelectionEntity::try_from).transpose()
    }

    async fn upsert(&self, selection: PlanSelectionEntity) -> Result<PlanSelectionEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let row = PlanSelectionRow::try_from(&selection)?;

        let saved = diesel::insert_into(plan_selections::table)
            .values(&row)
            .on_conflict(plan_selections::user_id)
            .do_update()
            .set((
                plan_selections::plan_name.eq(excluded(plan_selections::plan_name)),
                plan_selections::total_ads.eq(excluded(plan_selections::total_ads)),
                plan_selections::ads_used.eq(excluded(plan_selections::ads_used)),
                plan_selections::max_ads_per_month.eq(excluded(plan_selections::max_ads_per_month)),
                plan_selections::validity_days.eq(excluded(plan_selections::validity_days)),
                plan_selections::total_price.eq(excluded(plan_selections::total_price)),
                plan_selections::selected_features.eq(excluded(plan_selections::selected_features)),
                plan_selections::subscription_start_date
                    .eq(excluded(plan_selections::subscription_start_date)),
                plan_selections::subscription_end_date
                    .eq(excluded(plan_selections::subscription_end_date)),
                plan_selections::last_usage_date.eq(excluded(plan_selections::last_usage_date)),
                plan_selections::payment_status.eq(excluded(plan_selections::payment_status)),
                plan_selections::is_active.eq(excluded(plan_selections::is_active)),
                plan_selections::updated_at.eq(excluded(plan_selections::updated_at)),
            ))
            .returning(PlanSelectionRow::as_returning())
            .get_result::<PlanSelectionRow>(&mut conn)?;

        PlanSelectionEntity::try_from(saved)
    }
}
