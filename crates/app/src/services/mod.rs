mod goals;
mod refresh;
mod settings;
mod tracking;
mod usage;

use std::sync::Arc;

use reconcile::{AppLabels, ReconciliationJob, UsageDataSource};
use tracker_core::Goal;
use tracker_db::{Db, UsageStore};

use crate::error::{AppError, Result};

pub use goals::GoalsService;
pub use refresh::{RefreshReport, RefreshService};
pub use settings::{SettingsService, SettingsSnapshot};
pub use tracking::TrackingService;
pub use usage::{PairStatus, UsageService};

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub usage: UsageService,
    pub goals: GoalsService,
    pub tracking: TrackingService,
    pub refresh: RefreshService,
    pub settings: SettingsService,
}

impl AppServices {
    pub fn new(
        store: &UsageStore,
        source: UsageDataSource,
        labels: Arc<dyn AppLabels>,
        job: ReconciliationJob,
    ) -> Self {
        Self {
            usage: UsageService::new(store.clone(), source.clone()),
            goals: GoalsService::new(store.clone()),
            tracking: TrackingService::new(store.clone(), source.clone(), labels.clone()),
            refresh: RefreshService::new(store.clone(), source, labels, job),
            settings: SettingsService::new(store.clone()),
        }
    }
}

fn require_goal(db: &Db, goal_id: i64) -> Result<Goal> {
    db.get_goal(goal_id)?.ok_or_else(|| missing_goal(goal_id))
}

fn missing_goal(goal_id: i64) -> AppError {
    AppError::NotFound(format!("goal {} not found", goal_id))
}

fn require_package(package_name: &str) -> Result<&str> {
    let package_name = package_name.trim();
    if package_name.is_empty() {
        return Err(AppError::InvalidInput(
            "package name must not be empty".to_string(),
        ));
    }
    Ok(package_name)
}
