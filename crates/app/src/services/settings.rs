use serde::Serialize;
use tracker_db::UsageStore;

use crate::error::Result;

/// Snapshot of user-configurable settings stored in the DB.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsSnapshot {
    pub default_daily_limit_minutes: u32,
}

#[derive(Clone)]
pub struct SettingsService {
    store: UsageStore,
}

impl SettingsService {
    pub(super) fn new(store: UsageStore) -> Self {
        Self { store }
    }

    pub fn get(&self) -> Result<SettingsSnapshot> {
        let db = self.store.connect()?;
        Ok(SettingsSnapshot {
            default_daily_limit_minutes: db.get_default_daily_limit_minutes()?,
        })
    }

    pub fn update(&self, default_daily_limit_minutes: Option<u32>) -> Result<()> {
        let db = self.store.connect()?;
        if let Some(minutes) = default_daily_limit_minutes {
            db.set_default_daily_limit_minutes(minutes)?;
        }
        Ok(())
    }
}
