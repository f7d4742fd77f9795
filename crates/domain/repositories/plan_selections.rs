use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::plan_selections::PlanSelectionEntity;

#[async_trait]
#[automock]
pub trait PlanSelectionRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<PlanSelectionEntity>>;
    /// Inserts the selection or replaces the user's existing one.
    async fn upsert(&self, selection: PlanSelectionEntity) -> Result<PlanSelectionEntity>;
}
