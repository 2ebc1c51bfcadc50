use tracker_core::Goal;
use tracker_db::UsageStore;

use crate::error::{AppError, Result};
use crate::services::{missing_goal, require_goal};

#[derive(Clone)]
pub struct GoalsService {
    store: UsageStore,
}

impl GoalsService {
    pub(super) fn new(store: UsageStore) -> Self {
        Self { store }
    }

    /// Without `daily_limit_minutes` the stored default applies.
    pub fn create(
        &self,
        name: &str,
        description: &str,
        daily_limit_minutes: Option<u32>,
    ) -> Result<Goal> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidInput(
                "goal name must not be empty".to_string(),
            ));
        }
        let db = self.store.connect()?;
        Ok(db.create_goal(name, description.trim(), daily_limit_minutes)?)
    }

    pub fn get(&self, goal_id: i64) -> Result<Goal> {
        require_goal(&self.store.connect()?, goal_id)
    }

    pub fn list(&self) -> Result<Vec<Goal>> {
        Ok(self.store.connect()?.list_goals()?)
    }

    pub fn set_limit(&self, goal_id: i64, daily_limit_minutes: u32) -> Result<()> {
        if !self
            .store
            .connect()?
            .set_goal_limit(goal_id, daily_limit_minutes)?
        {
            return Err(missing_goal(goal_id));
        }
        Ok(())
    }

    /// Deletes the goal and its usage history.
    pub fn delete(&self, goal_id: i64) -> Result<()> {
        if !self.store.connect()?.delete_goal(goal_id)? {
            return Err(missing_goal(goal_id));
        }
        self.store.notify_changed();
        Ok(())
    }
}
