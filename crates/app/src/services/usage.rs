use chrono::{Local, NaiveDate};
use reconcile::UsageDataSource;
use serde::Serialize;
use tracker_core::{UsageRecord, UsageStatus, current_streak, usage_status};
use tracker_db::{LiveQuery, UsageStore};

use crate::config::RangeParams;
use crate::error::Result;
use crate::util::time::resolve_range;

/// Today's standing of one tracked pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairStatus {
    pub goal_id: i64,
    pub package_name: String,
    pub app_name: Option<String>,
    pub status: UsageStatus,
    pub streak: u32,
}

/// Read side: history, aggregates, streaks and status.
#[derive(Clone)]
pub struct UsageService {
    store: UsageStore,
    source: UsageDataSource,
}

impl UsageService {
    pub(super) fn new(store: UsageStore, source: UsageDataSource) -> Self {
        Self { store, source }
    }

    pub fn has_permission(&self) -> bool {
        self.source.has_permission()
    }

    pub fn history(&self, goal_id: i64) -> LiveQuery<Vec<UsageRecord>> {
        self.store.history_for(goal_id)
    }

    pub fn range(&self, goal_id: i64, params: &RangeParams) -> Result<LiveQuery<Vec<UsageRecord>>> {
        let range = resolve_range(params)?;
        Ok(self.store.range_for(goal_id, range.start, range.end))
    }

    pub fn record_for(
        &self,
        goal_id: i64,
        package_name: &str,
        date: NaiveDate,
    ) -> Result<Option<UsageRecord>> {
        Ok(self.store.find(goal_id, package_name, date)?)
    }

    pub fn streak(&self, goal_id: i64, package_name: &str) -> Result<u32> {
        let history = self.store.history_for_package(goal_id, package_name)?;
        Ok(current_streak(&history, package_name))
    }

    pub fn average(&self, goal_id: i64, params: &RangeParams) -> Result<Option<f64>> {
        let range = resolve_range(params)?;
        Ok(self.store.average_in_range(goal_id, range.start, range.end)?)
    }

    pub fn total_for_date(&self, package_name: &str, date: NaiveDate) -> Result<Option<u32>> {
        Ok(self.store.sum_for_date(package_name, date)?)
    }

    pub fn last_compliant(&self, goal_id: i64) -> Result<Option<NaiveDate>> {
        Ok(self.store.last_compliant_date(goal_id)?)
    }

    pub fn is_within_limit(&self, goal_id: i64, package_name: &str) -> Result<bool> {
        self.is_within_limit_on(goal_id, package_name, Local::now().date_naive())
    }

    /// A pair with no record on `date` counts as within its limit. Without
    /// usage access nothing is known, so nothing is within the limit.
    pub fn is_within_limit_on(
        &self,
        goal_id: i64,
        package_name: &str,
        date: NaiveDate,
    ) -> Result<bool> {
        if !self.has_permission() {
            return Ok(false);
        }
        Ok(self
            .store
            .find(goal_id, package_name, date)?
            .is_none_or(|record| record.is_compliant()))
    }

    pub fn today_status(&self, goal_id: i64, package_name: &str) -> Result<UsageStatus> {
        self.status_on(goal_id, package_name, Local::now().date_naive())
    }

    pub fn status_on(
        &self,
        goal_id: i64,
        package_name: &str,
        date: NaiveDate,
    ) -> Result<UsageStatus> {
        let record = self.store.find(goal_id, package_name, date)?;
        Ok(usage_status(self.has_permission(), record.as_ref()))
    }

    /// Status and streak of every tracked pair on `date`.
    pub fn status_board(&self, date: NaiveDate) -> Result<Vec<PairStatus>> {
        let has_permission = self.has_permission();
        let db = self.store.connect()?;
        let mut board = Vec::new();
        for pair in db.tracked_pairs()? {
            let record = db.find_usage(pair.goal_id, &pair.package_name, date)?;
            let history = db.usage_history_for_package(pair.goal_id, &pair.package_name)?;
            board.push(PairStatus {
                status: usage_status(has_permission, record.as_ref()),
                app_name: record.map(|record| record.app_name),
                streak: current_streak(&history, &pair.package_name),
                goal_id: pair.goal_id,
                package_name: pair.package_name,
            });
        }
        Ok(board)
    }
}
