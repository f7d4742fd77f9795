use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::analyses::{AnalysisEntity, InsertAnalysisEntity};

#[async_trait]
#[automock]
pub trait AnalysisRepository {
    async fn insert(&self, analysis: InsertAnalysisEntity) -> Result<Uuid>;
    async fn list_by_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<AnalysisEntity>>;
}
