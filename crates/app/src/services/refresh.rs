use std::sync::Arc;

use chrono::{DateTime, Local};
use reconcile::{AppLabels, JobOutcome, ReconciliationJob, UsageDataSource, display_name};
use serde::Serialize;
use tracker_core::{UsageRecord, UsageUpsert};
use tracker_db::UsageStore;

use crate::error::{AppError, Result};
use crate::services::require_goal;

/// Outcome of a manual refresh plus today's records of tracked pairs.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub outcome: JobOutcome,
    pub records: Vec<UsageRecord>,
}

#[derive(Clone)]
pub struct RefreshService {
    store: UsageStore,
    source: UsageDataSource,
    labels: Arc<dyn AppLabels>,
    job: ReconciliationJob,
}

impl RefreshService {
    pub(super) fn new(
        store: UsageStore,
        source: UsageDataSource,
        labels: Arc<dyn AppLabels>,
        job: ReconciliationJob,
    ) -> Self {
        Self {
            store,
            source,
            labels,
            job,
        }
    }

    pub fn job(&self) -> &ReconciliationJob {
        &self.job
    }

    pub fn run(&self) -> JobOutcome {
        self.job.run()
    }

    pub fn refresh_all(&self) -> Result<RefreshReport> {
        self.refresh_all_at(Local::now())
    }

    pub fn refresh_all_at(&self, now: DateTime<Local>) -> Result<RefreshReport> {
        let outcome = self.job.run_at(now);
        let mut records = Vec::new();
        if outcome.is_success() {
            let db = self.store.connect()?;
            let today = now.date_naive();
            for pair in db.tracked_pairs()? {
                if let Some(record) = db.find_usage(pair.goal_id, &pair.package_name, today)? {
                    records.push(record);
                }
            }
        }
        Ok(RefreshReport { outcome, records })
    }

    pub fn refresh_one(&self, goal_id: i64, package_name: &str) -> Result<UsageRecord> {
        self.refresh_one_at(goal_id, package_name, Local::now())
    }

    /// Re-reads today's usage of one tracked pair.
    pub fn refresh_one_at(
        &self,
        goal_id: i64,
        package_name: &str,
        now: DateTime<Local>,
    ) -> Result<UsageRecord> {
        if !self.source.has_permission() {
            return Err(AppError::Message("usage access not granted".to_string()));
        }
        let db = self.store.connect()?;
        if !db.is_tracked(goal_id, package_name)? {
            return Err(AppError::NotFound(format!(
                "{} is not tracked under goal {}",
                package_name, goal_id
            )));
        }
        let goal = require_goal(&db, goal_id)?;
        let record = db.upsert_usage(&UsageUpsert {
            goal_id,
            package_name: package_name.to_string(),
            usage_date: now.date_naive(),
            duration_minutes: self.source.query_today_usage_minutes_at(package_name, now),
            daily_limit_minutes: goal.daily_limit_minutes,
            app_name: display_name(self.labels.as_ref(), package_name),
        })?;
        self.store.notify_changed();
        Ok(record)
    }
}
