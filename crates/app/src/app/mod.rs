use std::path::PathBuf;
use std::sync::Arc;

use log::info;
use reconcile::{AppLabels, ReconciliationJob, UsageDataSource};
use tracker_db::UsageStore;

use crate::error::Result;
use crate::services::AppServices;

/// Paths and files needed to run the local tracker.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: PathBuf,
}

/// Composition root shared by frontends: one store, one data source and the
/// services built on them.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: UsageStore,
    pub services: AppServices,
}

impl AppState {
    /// Opens (and migrates) the database, then wires the services.
    pub fn open(
        config: AppConfig,
        source: UsageDataSource,
        labels: Arc<dyn AppLabels>,
    ) -> Result<Self> {
        let fresh = !config.db_path.exists();
        let store = UsageStore::open(&config.db_path)?;
        if fresh {
            info!("created usage database at {}", config.db_path.display());
        }
        let job = ReconciliationJob::new(store.clone(), source.clone(), labels.clone());
        let services = AppServices::new(&store, source, labels, job);
        Ok(Self {
            config,
            store,
            services,
        })
    }

    /// The scheduled job, as handed to a runner.
    pub fn job(&self) -> ReconciliationJob {
        self.services.refresh.job().clone()
    }

    pub fn has_permission(&self) -> bool {
        self.services.usage.has_permission()
    }
}
