//! crates/study_assistant_core/src/planner.rs
//!
//! Study plan use cases on top of the storage port.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{NewStudyPlan, StudyPlan};
use crate::error::{CoreError, CoreResult};
use crate::ports::DatabaseService;

#[derive(Clone)]
pub struct StudyPlanner {
    db: Arc<dyn DatabaseService>,
}

impl StudyPlanner {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    /// Validates and stores a new plan. The schedule is stored as given.
    pub async fn create_plan(&self, user_id: Uuid, plan: NewStudyPlan) -> CoreResult<StudyPlan> {
        plan.validate()?;
        let stored = self
            .db
            .insert_study_plan(user_id, &plan)
            .await
            .map_err(CoreError::collaborator("insert_study_plan"))?;
        info!(
            "Created study plan {} with {} scheduled day(s) for user {}",
            stored.id,
            stored.schedule.len(),
            user_id
        );
        Ok(stored)
    }

    /// Newest first.
    pub async fn list_plans(&self, user_id: Uuid) -> CoreResult<Vec<StudyPlan>> {
        self.db
            .list_study_plans(user_id)
            .await
            .map_err(CoreError::collaborator("list_study_plans"))
    }

    pub async fn get_plan(&self, user_id: Uuid, plan_id: Uuid) -> CoreResult<StudyPlan> {
        self.db
            .get_study_plan(user_id, plan_id)
            .await
            .map_err(CoreError::collaborator("get_study_plan"))
    }

    pub async fn delete_plan(&self, user_id: Uuid, plan_id: Uuid) -> CoreResult<()> {
        self.db
            .delete_study_plan(user_id, plan_id)
            .await
            .map_err(CoreError::collaborator("delete_study_plan"))?;
        info!("Deleted study plan {} for user {}", plan_id, user_id);
        Ok(())
    }
}
