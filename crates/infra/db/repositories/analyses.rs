use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain;
use crate::infra::db::postgres::{postgres_connection::PgPoolSquad, schema::analyses};
use domain::{
    entities::analyses::{AnalysisEntity, InsertAnalysisEntity},
    repositories::analyses::AnalysisRepository,
};

pub struct AnalysisPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl AnalysisPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl AnalysisRepository for AnalysisPostgres {
    async fn insert(&self, analysis: InsertAnalysisEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let id = diesel::insert_into(analyses::table)
            .values(&analysis)
            .returning(analyses::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(id)
    }

    async fn list_by_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<AnalysisEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = analyses::table
            .filter(analyses::user_id.eq(user_id))
            .order(analyses::created_at.desc())
            .limit(limit)
            .select(AnalysisEntity::as_select())
            .load::<AnalysisEntity>(&mut conn)?;

        Ok(rows)
    }
}
