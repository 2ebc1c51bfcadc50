use std::sync::Arc;

use chrono::{DateTime, Local};
use log::info;
use reconcile::{AppLabels, UsageDataSource, display_name};
use tracker_core::{TrackedPair, UsageRecord, UsageUpsert};
use tracker_db::UsageStore;

use crate::error::{AppError, Result};
use crate::services::{require_goal, require_package};

#[derive(Clone)]
pub struct TrackingService {
    store: UsageStore,
    source: UsageDataSource,
    labels: Arc<dyn AppLabels>,
}

impl TrackingService {
    pub(super) fn new(
        store: UsageStore,
        source: UsageDataSource,
        labels: Arc<dyn AppLabels>,
    ) -> Self {
        Self {
            store,
            source,
            labels,
        }
    }

    pub fn track_app(&self, goal_id: i64, package_name: &str) -> Result<UsageRecord> {
        self.track_app_at(goal_id, package_name, Local::now())
    }

    /// Starts tracking a package under a goal by writing today's record with
    /// the goal's limit. Earlier days of the pair are tracked again too.
    pub fn track_app_at(
        &self,
        goal_id: i64,
        package_name: &str,
        now: DateTime<Local>,
    ) -> Result<UsageRecord> {
        let package_name = require_package(package_name)?;
        let mut db = self.store.connect()?;
        let goal = require_goal(&db, goal_id)?;
        let record = db.start_tracking(&UsageUpsert {
            goal_id,
            package_name: package_name.to_string(),
            usage_date: now.date_naive(),
            duration_minutes: self.source.query_today_usage_minutes_at(package_name, now),
            daily_limit_minutes: goal.daily_limit_minutes,
            app_name: display_name(self.labels.as_ref(), package_name),
        })?;
        self.store.notify_changed();
        info!("tracking {} under goal {}", package_name, goal_id);
        Ok(record)
    }

    /// Stops tracking; history stays in place.
    pub fn untrack(&self, goal_id: i64, package_name: &str) -> Result<usize> {
        let updated = self
            .store
            .registry()
            .set_tracked(package_name, goal_id, false)?;
        if updated == 0 {
            return Err(AppError::NotFound(format!(
                "{} is not recorded under goal {}",
                package_name, goal_id
            )));
        }
        info!("stopped tracking {} under goal {}", package_name, goal_id);
        Ok(updated)
    }

    pub fn tracked(&self) -> Result<Vec<TrackedPair>> {
        Ok(self.store.registry().tracked_pairs()?)
    }

    pub fn is_tracked(&self, goal_id: i64, package_name: &str) -> Result<bool> {
        Ok(self.store.registry().is_tracked(goal_id, package_name)?)
    }
}
